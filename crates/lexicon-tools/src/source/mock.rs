//! Mock Lexicon Source
//!
//! For testing and demo purposes. Serves small static lexicons.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{DocumentSource, FetchRequest};
use crate::error::{LexiconError, Result};

/// Mock source with built-in sample lexicons
#[derive(Default)]
pub struct MockDocumentSource {
    /// Replaces the built-in catalogue when set
    fixed: Option<Value>,
}

impl MockDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for every model and country
    pub fn with_document(document: Value) -> Self {
        Self { fixed: Some(document) }
    }

    fn sample(model: &str) -> Option<Value> {
        match model.to_lowercase().as_str() {
            "touring" => Some(json!({
                "interior": {
                    "leather_seats": {
                        "description": "Heated leather seating with memory function",
                        "available": true,
                        "price": 1500,
                        "code": "INT-LS"
                    },
                    "ambientLighting": {
                        "description": "Multi-colour ambient lighting",
                        "available": true,
                        "price": 350,
                        "optional": true
                    },
                    "floor_mats": {"name": "All-weather floor mats", "status": "standard"}
                },
                "exterior": {
                    "panoramic_sunroof": {
                        "description": "Tilting glass panoramic sunroof",
                        "available": true,
                        "price": 1200,
                        "code": "EXT-SR"
                    },
                    "paint": {
                        "colors": ["Alpine White", "Carbon Black", "Portimao Blue"],
                        "standard": "Alpine White"
                    }
                },
                "safety": {
                    "lane_assist": {
                        "description": "Lane keeping assist with steering intervention",
                        "available": true,
                        "standard": true
                    },
                    "airbags": {"description": "Front, side and curtain airbags", "standard": true}
                },
                "technology": {
                    "navigation": {
                        "description": "Navigation system with live traffic",
                        "available": false,
                        "price": 900
                    }
                },
                "packages": [
                    {
                        "name": "Winter Package",
                        "description": "Heated steering wheel and heated rear seats",
                        "price": 700,
                        "code": "PKG-W"
                    },
                    {
                        "name": "Sport Package",
                        "description": "Sport suspension and 19 inch wheels",
                        "price": 2100,
                        "code": "PKG-S"
                    }
                ]
            })),
            "city" => Some(json!({
                "interior": {
                    "cloth_seats": {"description": "Durable cloth seating", "standard": true},
                    "climate_control": {"description": "Manual air conditioning", "available": true, "price": 0}
                },
                "technology": {
                    "display": {"description": "8 inch touch display", "available": true, "price": 0}
                }
            })),
            _ => None,
        }
    }
}

#[async_trait]
impl DocumentSource for MockDocumentSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value> {
        if let Some(document) = &self.fixed {
            return Ok(document.clone());
        }
        if request.country.trim().is_empty() {
            return Err(LexiconError::Fetch("country is required".into()));
        }
        Self::sample(&request.model)
            .ok_or_else(|| LexiconError::Fetch(format!("no lexicon for model '{}'", request.model)))
    }

    fn name(&self) -> &str {
        "MockLexiconService"
    }
}
