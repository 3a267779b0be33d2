//! Klaviyo event payload types.
//!
//! These types follow Klaviyo's JSON:API format with `data`, `attributes`, etc.
//! See `POST /api/events`.

use chrono::SecondsFormat;
use journey_seeder_core::{Event, Metric, Profile};
use serde::Serialize;

/// Input for creating an event.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventInput<'a> {
    pub data: CreateEventData<'a>,
}

/// Event resource.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEventData<'a> {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: EventAttributes<'a>,
}

/// Event attributes.
#[derive(Debug, Clone, Serialize)]
pub struct EventAttributes<'a> {
    pub properties: EventProperties<'a>,
    pub metric: Relationship<MetricAttributes>,
    pub profile: Relationship<ProfileAttributes<'a>>,
    /// RFC 3339 timestamp, UTC, whole seconds.
    pub time: String,
    pub value: f64,
}

/// Wrapper for an embedded related resource.
#[derive(Debug, Clone, Serialize)]
pub struct Relationship<T> {
    pub data: RelatedResource<T>,
}

/// Embedded resource with its type tag.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedResource<T> {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: T,
}

/// Metric attributes.
#[derive(Debug, Clone, Serialize)]
pub struct MetricAttributes {
    pub name: Metric,
}

/// Profile attributes.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileAttributes<'a> {
    pub email: &'a str,
    pub external_id: String,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub properties: ProfileProperties,
}

/// Custom profile properties, keyed the way they show in the Klaviyo UI.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileProperties {
    #[serde(rename = "Preference Type")]
    pub preference_type: &'static str,
    #[serde(rename = "Frame Shape")]
    pub frame_shape: &'static str,
    #[serde(rename = "Preferred Colour")]
    pub preferred_colour: &'static str,
    #[serde(rename = "Prescription")]
    pub prescription: &'static str,
    #[serde(rename = "Subscriber")]
    pub subscriber: bool,
    #[serde(rename = "$source")]
    pub source: &'static str,
}

/// Event properties.
///
/// Serializes to `{}` when the event has no product attached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventProperties<'a> {
    #[serde(flatten)]
    pub product: Option<ProductProperties<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_completed: Option<bool>,
}

/// Product details carried on product events.
#[derive(Debug, Clone, Serialize)]
pub struct ProductProperties<'a> {
    pub product_id: &'a str,
    pub product_name: &'a str,
    pub quantity: u32,
    pub price_each: f64,
    pub total_price: f64,
    pub category: &'a str,
    pub image_url: &'a str,
    pub product_url: &'a str,
}

impl<'a> From<&'a Profile> for ProfileAttributes<'a> {
    fn from(profile: &'a Profile) -> Self {
        let prefs = &profile.preferences;
        Self {
            email: profile.email.as_str(),
            external_id: profile.id.to_string(),
            first_name: &profile.first_name,
            last_name: &profile.last_name,
            properties: ProfileProperties {
                preference_type: prefs.preference_type.as_str(),
                frame_shape: prefs.frame_shape.as_str(),
                preferred_colour: prefs.preferred_colour.as_str(),
                prescription: prefs.prescription.as_str(),
                subscriber: prefs.subscriber,
                source: prefs.source.as_str(),
            },
        }
    }
}

impl<'a> From<&Event<'a>> for EventProperties<'a> {
    /// Shipping country and checkout state only travel with a product.
    fn from(event: &Event<'a>) -> Self {
        let Some(line) = event.line else {
            return Self::default();
        };
        let product = line.product;

        Self {
            product: Some(ProductProperties {
                product_id: &product.id,
                product_name: &product.title,
                quantity: line.quantity,
                price_each: product.price,
                total_price: line.total(),
                category: &product.category,
                image_url: &product.image_url,
                product_url: &product.url,
            }),
            shipping_country: event.shipping_country,
            checkout_completed: match event.metric {
                Metric::StartedCheckout => event.checkout_completed,
                _ => None,
            },
        }
    }
}

impl<'a> From<&Event<'a>> for CreateEventInput<'a> {
    fn from(event: &Event<'a>) -> Self {
        Self {
            data: CreateEventData {
                resource_type: "event",
                attributes: EventAttributes {
                    properties: EventProperties::from(event),
                    metric: Relationship {
                        data: RelatedResource {
                            resource_type: "metric",
                            attributes: MetricAttributes { name: event.metric },
                        },
                    },
                    profile: Relationship {
                        data: RelatedResource {
                            resource_type: "profile",
                            attributes: ProfileAttributes::from(event.profile),
                        },
                    },
                    time: event.time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    value: event.value(),
                },
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use journey_seeder_core::{
        AcquisitionSource, Colour, FrameShape, PreferenceType, Preferences, Prescription, Product,
        ProfileId,
    };
    use serde_json::{Value, json};

    use super::*;

    fn profile() -> Profile {
        Profile::new(
            ProfileId::from_random_bytes([0x11; 16]),
            "Ada".to_string(),
            "Lovelace".to_string(),
            Preferences {
                preference_type: PreferenceType::ContactLenses,
                frame_shape: FrameShape::CatEye,
                preferred_colour: Colour::Tortoise,
                prescription: Prescription::Astigmatism,
                subscriber: true,
                source: AcquisitionSource::PartnerWebsite,
            },
        )
    }

    fn aviator() -> Product {
        Product {
            id: "42".to_string(),
            title: "Aviator Classic".to_string(),
            price: 89.99,
            category: "Sunglasses".to_string(),
            url: "https://shop.example/aviator-classic".to_string(),
            image_url: "https://shop.example/img/aviator.jpg".to_string(),
            inventory: 25,
            rating: 4.6,
        }
    }

    fn to_json(event: &Event<'_>) -> Value {
        serde_json::to_value(CreateEventInput::from(event)).unwrap()
    }

    #[test]
    fn test_envelope_without_product() {
        let profile = profile();
        let time = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let json = to_json(&Event::new(Metric::ActiveOnSite, &profile, time));

        assert_eq!(
            json,
            json!({
                "data": {
                    "type": "event",
                    "attributes": {
                        "properties": {},
                        "metric": {
                            "data": {"type": "metric", "attributes": {"name": "Active on Site"}}
                        },
                        "profile": {
                            "data": {
                                "type": "profile",
                                "attributes": {
                                    "email": "ada.lovelace@klaviyo-demo.com",
                                    "external_id": profile.id.to_string(),
                                    "first_name": "Ada",
                                    "last_name": "Lovelace",
                                    "properties": {
                                        "Preference Type": "contact lenses",
                                        "Frame Shape": "cat-eye",
                                        "Preferred Colour": "tortoise",
                                        "Prescription": "astigmatism",
                                        "Subscriber": true,
                                        "$source": "partner_website"
                                    }
                                }
                            }
                        },
                        "time": "2025-02-03T04:05:06Z",
                        "value": 0.0
                    }
                }
            })
        );
    }

    #[test]
    fn test_added_to_cart_properties() {
        let profile = profile();
        let product = aviator();
        let event = Event::new(Metric::AddedToCart, &profile, Utc::now()).with_line(&product, 3);
        let json = to_json(&event);
        let attributes = &json["data"]["attributes"];

        assert_eq!(
            attributes["properties"],
            json!({
                "product_id": "42",
                "product_name": "Aviator Classic",
                "quantity": 3,
                "price_each": 89.99,
                "total_price": 269.97,
                "category": "Sunglasses",
                "image_url": "https://shop.example/img/aviator.jpg",
                "product_url": "https://shop.example/aviator-classic"
            })
        );
        assert_eq!(attributes["value"], json!(269.97));
    }

    #[test]
    fn test_checkout_flag_only_on_started_checkout() {
        let profile = profile();
        let product = aviator();
        let started = Event::new(Metric::StartedCheckout, &profile, Utc::now())
            .with_line(&product, 2)
            .with_shipping_country(Some("Jersey"))
            .with_checkout_completed(false);
        let props = &to_json(&started)["data"]["attributes"]["properties"];
        assert_eq!(props["checkout_completed"], json!(false));
        assert_eq!(props["shipping_country"], json!("Jersey"));

        let placed = Event::new(Metric::PlacedOrder, &profile, Utc::now())
            .with_line(&product, 2)
            .with_shipping_country(Some("Ireland"))
            .with_checkout_completed(true);
        let props = &to_json(&placed)["data"]["attributes"]["properties"];
        assert!(props.get("checkout_completed").is_none());
        assert_eq!(props["shipping_country"], json!("Ireland"));
    }

    #[test]
    fn test_shipping_country_dropped_without_product() {
        let profile = profile();
        let event = Event::new(Metric::ActiveOnSite, &profile, Utc::now())
            .with_shipping_country(Some("Guernsey"));
        assert_eq!(to_json(&event)["data"]["attributes"]["properties"], json!({}));
    }
}
