//! Synthetic customer profiles and their preference enumerations.
//!
//! Each preference enumeration is declared with [`preference_enum!`], which
//! gives it a wire label, an `ALL` list and a uniform
//! [`Distribution`] impl so generators can call `rng.random::<FrameShape>()`.

use core::fmt;

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::Serialize;

use super::email::Email;
use super::id::ProfileId;

/// Macro to define a closed preference enumeration.
///
/// Creates an enum with:
/// - one serde rename per variant, using the given label
/// - `ALL` listing every variant in declaration order
/// - `as_str()` and `Display` returning the label
/// - a uniform `Distribution<Self>` impl for [`StandardUniform`]
macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Label sent to Klaviyo.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Distribution<$name> for StandardUniform {
            #[allow(clippy::indexing_slicing)] // index drawn from 0..ALL.len()
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $name {
                $name::ALL[rng.random_range(0..$name::ALL.len())]
            }
        }
    };
}

preference_enum! {
    /// Kind of eyewear the customer buys.
    PreferenceType {
        Glasses => "glasses",
        ContactLenses => "contact lenses",
    }
}

preference_enum! {
    /// Preferred frame shape.
    FrameShape {
        Round => "round",
        Square => "square",
        Rectangle => "rectangle",
        Aviator => "aviator",
        CatEye => "cat-eye",
    }
}

preference_enum! {
    /// Preferred frame colour.
    Colour {
        Black => "black",
        Brown => "brown",
        Blue => "blue",
        Red => "red",
        Tortoise => "tortoise",
    }
}

preference_enum! {
    /// Prescription the customer needs.
    Prescription {
        ShortSighted => "short-sighted",
        LongSighted => "long-sighted",
        Astigmatism => "astigmatism",
    }
}

preference_enum! {
    /// Channel the customer was acquired through (Klaviyo `$source`).
    AcquisitionSource {
        Newsletter => "newsletter",
        PartnerWebsite => "partner_website",
        Google => "google",
        Bing => "bing",
        Facebook => "facebook",
        Instagram => "instagram",
        Twitter => "twitter",
        Linkedin => "linkedin",
    }
}

/// Preference attributes attached to every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub preference_type: PreferenceType,
    pub frame_shape: FrameShape,
    pub preferred_colour: Colour,
    pub prescription: Prescription,
    pub subscriber: bool,
    pub source: AcquisitionSource,
}

impl Distribution<Preferences> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Preferences {
        Preferences {
            preference_type: rng.random(),
            frame_shape: rng.random(),
            preferred_colour: rng.random(),
            prescription: rng.random(),
            subscriber: rng.random(),
            source: rng.random(),
        }
    }
}

/// A simulated customer.
///
/// Created once per simulated user and reused, unchanged, across all of
/// that user's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub preferences: Preferences,
}

impl Profile {
    /// Build a profile, deriving the demo email from the names.
    #[must_use]
    pub fn new(
        id: ProfileId,
        first_name: String,
        last_name: String,
        preferences: Preferences,
    ) -> Self {
        let email = Email::demo_address(&first_name, &last_name);
        Self {
            id,
            email,
            first_name,
            last_name,
            preferences,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(PreferenceType::ContactLenses.as_str(), "contact lenses");
        assert_eq!(FrameShape::CatEye.to_string(), "cat-eye");
        assert_eq!(AcquisitionSource::PartnerWebsite.as_str(), "partner_website");
    }

    #[test]
    fn test_all_lists_every_variant() {
        assert_eq!(PreferenceType::ALL.len(), 2);
        assert_eq!(FrameShape::ALL.len(), 5);
        assert_eq!(Colour::ALL.len(), 5);
        assert_eq!(Prescription::ALL.len(), 3);
        assert_eq!(AcquisitionSource::ALL.len(), 8);
    }

    #[test]
    fn test_sampling_covers_every_variant() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(rng.random::<AcquisitionSource>());
        }
        assert_eq!(seen.len(), AcquisitionSource::ALL.len());
    }

    #[test]
    fn test_profile_new_derives_email() {
        let prefs: Preferences = StdRng::seed_from_u64(1).random();
        let profile = Profile::new(
            ProfileId::from_random_bytes([1; 16]),
            "Linus".to_string(),
            "Pauling".to_string(),
            prefs,
        );
        assert_eq!(profile.email.as_str(), "linus.pauling@klaviyo-demo.com");
    }
}
