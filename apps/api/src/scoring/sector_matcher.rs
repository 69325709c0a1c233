//! Sector matcher: finds catalog keywords in resume text.
//!
//! Matching is a plain case-insensitive substring test: no tokenization and no word
//! boundaries, so short keywords such as "r" also hit inside longer words.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scoring::catalog::Catalog;

/// Keywords found for one sector, in the sector's declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorHits {
    pub sector: String,
    pub keywords: Vec<String>,
}

/// Every keyword found in one resume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoundKeywords {
    /// Only sectors with at least one hit, in catalog order.
    pub by_sector: Vec<SectorHits>,
    /// Deduplicated across sectors. Used for job scoring.
    pub all: HashSet<String>,
    /// One per (sector, keyword) hit, so a keyword listed in two sectors counts twice.
    pub total: usize,
}

impl FoundKeywords {
    pub fn contains(&self, keyword: &str) -> bool {
        self.all.contains(keyword)
    }

    pub fn sector_has_hits(&self, sector: &str) -> bool {
        self.by_sector.iter().any(|s| s.sector == sector)
    }

    /// The sector with the most hits. Ties go to the sector declared first.
    pub fn primary_sector(&self) -> Option<&str> {
        let mut best: Option<&SectorHits> = None;
        for hits in &self.by_sector {
            if best.map_or(true, |b| hits.keywords.len() > b.keywords.len()) {
                best = Some(hits);
            }
        }
        best.map(|b| b.sector.as_str())
    }
}

/// Scans `resume_text` for every sector keyword in the catalog.
pub fn find_keywords(resume_text: &str, catalog: &Catalog) -> FoundKeywords {
    // Catalog keywords are stored lowercase, so only the text needs folding.
    let text = resume_text.to_lowercase();
    let mut found = FoundKeywords::default();

    for sector in &catalog.sectors {
        let hits: Vec<String> = sector
            .keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .cloned()
            .collect();

        if hits.is_empty() {
            continue;
        }

        found.total += hits.len();
        found.all.extend(hits.iter().cloned());
        found.by_sector.push(SectorHits {
            sector: sector.name.clone(),
            keywords: hits,
        });
    }

    found
}
