use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

pub const DEFAULT_RADIUS_METERS: u32 = 3000;
pub const DEFAULT_LIMIT: u32 = 10;
const MAX_RADIUS_METERS: u32 = 50_000;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub name: &'static str,
    pub search_terms: &'static [&'static str],
}

pub const SPECIALTIES: &[Specialty] = &[
    Specialty { name: "General Physician", search_terms: &["general practitioner", "doctor"] },
    Specialty { name: "Dermatologist", search_terms: &["skin clinic", "dermatology"] },
    Specialty { name: "Gastroenterologist", search_terms: &["stomach clinic", "gastro clinic"] },
    Specialty { name: "Cardiologist", search_terms: &["heart clinic", "cardiology"] },
    Specialty { name: "Endocrinologist", search_terms: &["endocrine clinic", "diabetes clinic"] },
    Specialty { name: "Pulmonologist", search_terms: &["lung clinic", "respiratory clinic"] },
    Specialty { name: "Neurologist", search_terms: &["neuro clinic", "neurology"] },
    Specialty { name: "Orthopedist", search_terms: &["orthopedic clinic", "bone clinic"] },
    Specialty {
        name: "Infectious Disease Specialist",
        search_terms: &["infection clinic", "fever clinic"],
    },
    Specialty { name: "Urologist", search_terms: &["urology", "urinary clinic"] },
    Specialty { name: "Immunologist", search_terms: &["immunology", "allergy specialist"] },
    Specialty { name: "Dentist", search_terms: &["dentist", "dental clinic"] },
    Specialty { name: "Ophthalmologist", search_terms: &["eye hospital", "ophthalmology"] },
    Specialty { name: "ENT Doctor", search_terms: &["ent clinic", "ear nose throat"] },
    Specialty { name: "Gynecologist", search_terms: &["gynecologist", "obgyn"] },
    Specialty { name: "Pediatrician", search_terms: &["pediatrician", "child clinic"] },
    Specialty { name: "Psychiatrist", search_terms: &["psychiatrist", "mental health clinic"] },
];

/// Case-insensitive lookup by display name.
pub fn find_specialty(name: &str) -> Option<&'static Specialty> {
    let name = name.trim();
    SPECIALTIES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorSearchError {
    #[error("TOMTOM_API_KEY is not configured")]
    MissingApiKey,
    #[error("unknown specialty: {0}")]
    UnknownSpecialty(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Poi {
    pub name: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoiAddress {
    pub freeform_address: String,
    pub municipality: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorResult {
    pub id: String,
    pub score: f64,
    pub dist: f64,
    pub poi: Poi,
    pub address: PoiAddress,
    pub position: Position,
}

#[derive(Debug, Deserialize)]
struct PoiSearchResponse {
    #[serde(default)]
    results: Vec<DoctorResult>,
}

#[derive(Debug, Clone, Copy)]
pub struct DoctorSearch<'a> {
    pub lat: f64,
    pub lon: f64,
    pub specialty: &'a str,
    pub radius: Option<u32>,
    pub limit: Option<u32>,
}

/// Keeps the first occurrence of each POI id, nearest first, capped at
/// `limit`.
pub fn merge_results(batches: Vec<Vec<DoctorResult>>, limit: usize) -> Vec<DoctorResult> {
    let mut seen = HashSet::new();
    let mut merged: Vec<DoctorResult> = batches
        .into_iter()
        .flatten()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    merged.sort_by(|a, b| a.dist.total_cmp(&b.dist));
    merged.truncate(limit);
    merged
}

#[derive(Debug, Clone)]
pub struct DoctorSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DoctorSearchClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn term_url(&self, term: &str) -> String {
        format!(
            "{}/search/2/poiSearch/{}.json",
            self.base_url,
            term.replace(' ', "%20")
        )
    }

    pub async fn search(
        &self,
        request: DoctorSearch<'_>,
    ) -> Result<Vec<DoctorResult>, DoctorSearchError> {
        let specialty = find_specialty(request.specialty)
            .ok_or_else(|| DoctorSearchError::UnknownSpecialty(request.specialty.to_string()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DoctorSearchError::MissingApiKey)?;

        let radius = request
            .radius
            .unwrap_or(DEFAULT_RADIUS_METERS)
            .clamp(1, MAX_RADIUS_METERS);
        let limit = request.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let lookups = specialty.search_terms.iter().map(|term| {
            self.search_term(term, request.lat, request.lon, radius, limit, api_key)
        });
        let batches: Vec<Vec<DoctorResult>> =
            join_all(lookups).await.into_iter().flatten().collect();

        let merged = merge_results(batches, limit as usize);
        info!(
            "🏥 Doctor search {} near {},{} → {} results",
            specialty.name,
            request.lat,
            request.lon,
            merged.len()
        );
        Ok(merged)
    }

    /// `None` when the term failed; the other terms still count.
    async fn search_term(
        &self,
        term: &str,
        lat: f64,
        lon: f64,
        radius: u32,
        limit: u32,
        api_key: &str,
    ) -> Option<Vec<DoctorResult>> {
        let resp = match self
            .client
            .get(self.term_url(term))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("radius", radius.to_string()),
                ("limit", limit.to_string()),
                ("key", api_key.to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("🏥 POI search '{}' unreachable: {}", term, e);
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!("🏥 POI search '{}' non-OK: {}", term, resp.status());
            return None;
        }

        match resp.json::<PoiSearchResponse>().await {
            Ok(parsed) => Some(parsed.results),
            Err(e) => {
                warn!("🏥 POI search '{}' JSON parse failed: {}", term, e);
                None
            }
        }
    }
}
