use serde::Serialize;

use crate::normalizer::{normalize_city, normalize_phone};

pub const DEFAULT_CATEGORY: &str = "Maintenance";

pub const CSV_HEADERS: [&str; 9] = [
    "source", "url", "name", "category", "phone", "city", "address", "lat", "lng",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    source: String,
    url: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub source: String,
    pub url: String,
    pub name: String,
    pub category: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
}

impl Record {
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Option<Self> {
        let source = source.into();
        let url = url.into();
        if source.trim().is_empty() || url.trim().is_empty() {
            return None;
        }
        Some(Record {
            source,
            url,
            name: None,
            category: Some(DEFAULT_CATEGORY.to_string()),
            phone: None,
            city: None,
            address: None,
            lat: None,
            lng: None,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = city;
        self
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    pub fn with_coordinates(mut self, lat: Option<f64>, lng: Option<f64>) -> Self {
        self.lat = lat;
        self.lng = lng;
        self
    }

    pub fn to_row(&self) -> Row {
        let trimmed = |field: &Option<String>| field.as_deref().unwrap_or("").trim().to_string();
        // `{:?}` keeps the trailing `.0` on whole degrees.
        let coordinate = |value: Option<f64>| value.map(|v| format!("{:?}", v)).unwrap_or_default();

        Row {
            source: self.source.clone(),
            url: self.url.clone(),
            name: trimmed(&self.name),
            category: trimmed(&self.category),
            phone: self.phone.as_deref().and_then(normalize_phone).unwrap_or_default(),
            city: self
                .city
                .as_deref()
                .and_then(normalize_city)
                .or_else(|| self.city.clone())
                .unwrap_or_default(),
            address: trimmed(&self.address),
            lat: coordinate(self.lat),
            lng: coordinate(self.lng),
        }
    }
}
