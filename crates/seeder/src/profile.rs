//! Synthetic customer generation.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use journey_seeder_core::{Profile, ProfileId};
use rand::Rng;

/// Generate one synthetic customer.
///
/// Names come from `fake`; the ID and every preference are drawn from `rng`,
/// so a seeded generator reproduces the same sequence of profiles. The
/// email is derived from the names and is not checked for uniqueness.
pub fn generate_profile<R: Rng + ?Sized>(rng: &mut R) -> Profile {
    let first_name: String = FirstName().fake_with_rng(rng);
    let last_name: String = LastName().fake_with_rng(rng);
    let id = ProfileId::from_random_bytes(rng.random());

    Profile::new(id, first_name, last_name, rng.random())
}

#[cfg(test)]
mod tests {
    use journey_seeder_core::{
        AcquisitionSource, Colour, DEMO_EMAIL_DOMAIN, FrameShape, PreferenceType, Prescription,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generated_profiles_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(2025);
        for _ in 0..200 {
            let profile = generate_profile(&mut rng);
            let email = profile.email.as_str();

            assert_eq!(email.matches('@').count(), 1);
            assert!(email.ends_with(&format!("@{DEMO_EMAIL_DOMAIN}")));
            assert!(!profile.first_name.is_empty());
            assert!(!profile.last_name.is_empty());

            let prefs = profile.preferences;
            assert!(PreferenceType::ALL.contains(&prefs.preference_type));
            assert!(FrameShape::ALL.contains(&prefs.frame_shape));
            assert!(Colour::ALL.contains(&prefs.preferred_colour));
            assert!(Prescription::ALL.contains(&prefs.prescription));
            assert!(AcquisitionSource::ALL.contains(&prefs.source));
        }
    }

    #[test]
    fn test_email_derived_from_names() {
        let mut rng = StdRng::seed_from_u64(7);
        let profile = generate_profile(&mut rng);
        let expected = format!(
            "{}.{}",
            profile.first_name.to_lowercase().replace(char::is_whitespace, ""),
            profile.last_name.to_lowercase().replace(char::is_whitespace, "")
        );
        assert_eq!(profile.email.local_part(), expected);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_profile(&mut StdRng::seed_from_u64(99));
        let b = generate_profile(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_subscriber_flag_varies() {
        let mut rng = StdRng::seed_from_u64(1);
        let subscribers = (0..200)
            .filter(|_| generate_profile(&mut rng).preferences.subscriber)
            .count();
        assert!(subscribers > 0 && subscribers < 200);
    }
}
