use serde::{Deserialize, Serialize};

use crate::geometry::PixelRect;

/// One barcode reported by a detector, in producer frame space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Barcode {
    pub bounding_box: Option<PixelRect>,
    pub raw_value: Option<String>,
    pub display_value: Option<String>,
    pub value_type: ValueType,
}

impl Barcode {
    /// Raw value, falling back to the display value, then to "".
    pub fn display_text(&self) -> &str {
        self.raw_value
            .as_deref()
            .or(self.display_value.as_deref())
            .unwrap_or("")
    }
}

/// Semantic category of a decoded payload.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Url,
    ContactInfo,
    Wifi,
    Geo,
    CalendarEvent,
    DriverLicense,
    Email,
    Phone,
    Sms,
    Text,
    #[default]
    Other,
}

impl ValueType {
    /// Maps the numeric category codes used by common mobile barcode SDKs.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ValueType::ContactInfo,
            2 => ValueType::Email,
            4 => ValueType::Phone,
            6 => ValueType::Sms,
            7 => ValueType::Text,
            8 => ValueType::Url,
            9 => ValueType::Wifi,
            10 => ValueType::Geo,
            11 => ValueType::CalendarEvent,
            12 => ValueType::DriverLicense,
            _ => ValueType::Other,
        }
    }

    /// Label shown on the annotation panel.
    pub fn label(self) -> &'static str {
        match self {
            ValueType::Url => "URL",
            ValueType::ContactInfo => "Contact",
            ValueType::Wifi => "WiFi",
            ValueType::Geo => "Location",
            ValueType::CalendarEvent => "Calendar Event",
            ValueType::DriverLicense => "License",
            ValueType::Email => "Email",
            ValueType::Phone => "Phone",
            ValueType::Sms => "SMS",
            ValueType::Text => "Text",
            ValueType::Other => "Other",
        }
    }
}
