//! Keyword catalog: the sector keyword table and job profile table.
//!
//! Both tables are immutable once built. `main` constructs one `Catalog` at startup
//! (built-in, or loaded from `KEYWORD_CATALOG_PATH`) and shares it behind an `Arc`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// One named sector and the keywords that signal it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub keywords: Vec<String>,
}

/// A job profile scored against the global found-keyword set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub keywords: Vec<String>,
    /// Added once per matched keyword. Must be positive.
    pub weight: f64,
}

/// Sector keyword table plus job profile table, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub sectors: Vec<Sector>,
    pub job_profiles: Vec<JobProfile>,
}

impl Catalog {
    /// Builds a catalog from raw tables: lowercases every keyword, drops duplicates
    /// within a list (first occurrence wins) and validates the result.
    pub fn new(sectors: Vec<Sector>, job_profiles: Vec<JobProfile>) -> Result<Self, CatalogError> {
        let catalog = Catalog {
            sectors: sectors
                .into_iter()
                .map(|s| Sector {
                    name: s.name,
                    keywords: normalize_keywords(s.keywords),
                })
                .collect(),
            job_profiles: job_profiles
                .into_iter()
                .map(|p| JobProfile {
                    title: p.title,
                    keywords: normalize_keywords(p.keywords),
                    weight: p.weight,
                })
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file shaped like `{"sectors": [...], "job_profiles": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: Catalog = serde_json::from_str(&raw)?;
        Catalog::new(parsed.sectors, parsed.job_profiles)
    }

    /// The built-in tables.
    pub fn builtin() -> Self {
        let sectors = BUILTIN_SECTORS
            .iter()
            .map(|(name, keywords)| Sector {
                name: name.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        let job_profiles = BUILTIN_JOB_PROFILES
            .iter()
            .map(|(title, keywords, weight)| JobProfile {
                title: title.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                weight: *weight,
            })
            .collect();

        Catalog {
            sectors,
            job_profiles,
        }
    }

    pub fn profile(&self, title: &str) -> Option<&JobProfile> {
        self.job_profiles.iter().find(|p| p.title == title)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.sectors.is_empty() {
            return Err(CatalogError::Invalid("at least one sector is required".to_string()));
        }
        for sector in &self.sectors {
            if sector.name.trim().is_empty() {
                return Err(CatalogError::Invalid("sector name cannot be empty".to_string()));
            }
            if sector.keywords.iter().any(|k| k.is_empty()) {
                return Err(CatalogError::Invalid(format!(
                    "sector '{}' contains an empty keyword",
                    sector.name
                )));
            }
        }
        // Recommendations look profiles up by title.
        for (i, profile) in self.job_profiles.iter().enumerate() {
            if self.job_profiles[..i].iter().any(|p| p.title == profile.title) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate job profile title '{}'",
                    profile.title
                )));
            }
            if profile.keywords.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "job profile '{}' has no keywords",
                    profile.title
                )));
            }
            if !(profile.weight.is_finite() && profile.weight > 0.0) {
                return Err(CatalogError::Invalid(format!(
                    "job profile '{}' must have a positive weight, got {}",
                    profile.title, profile.weight
                )));
            }
        }
        Ok(())
    }
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

const BUILTIN_SECTORS: &[(&str, &[&str])] = &[
    (
        "Software Development",
        &[
            "javascript", "react", "vue", "angular", "node.js", "express", "python", "django",
            "flask", "java", "spring", "c++", "c#", ".net", "html", "css", "tailwind", "sass",
            "sql", "mysql", "postgresql", "mongodb", "nosql", "rest", "api", "graphql", "git",
            "github", "gitlab", "docker", "kubernetes", "aws", "azure", "gcp", "ci/cd", "devops",
            "microservices", "typescript", "php", "laravel", "ruby", "rails",
        ],
    ),
    (
        "Data Science & Analytics",
        &[
            "python", "r", "sql", "tensorflow", "pytorch", "keras", "scikit-learn", "pandas",
            "numpy", "matplotlib", "seaborn", "machine learning", "deep learning", "nlp",
            "natural language processing", "data visualization", "statistics",
            "statistical analysis", "big data", "hadoop", "spark", "etl", "data warehousing",
            "business intelligence", "tableau", "power bi",
        ],
    ),
    (
        "Project Management",
        &[
            "agile", "scrum", "kanban", "lean", "pmp", "prince2", "jira", "confluence", "trello",
            "asana", "project planning", "risk management", "stakeholder management", "budgeting",
            "sdlc", "project lifecycle", "gantt chart",
        ],
    ),
    (
        "UI/UX Design",
        &[
            "figma", "sketch", "adobe xd", "invision", "zeplin", "user research", "wireframing",
            "prototyping", "usability testing", "user journey", "ui design", "ux design",
            "design thinking", "user interface", "user experience", "interaction design",
            "design system",
        ],
    ),
];

const BUILTIN_JOB_PROFILES: &[(&str, &[&str], f64)] = &[
    (
        "Frontend Developer",
        &["html", "css", "javascript", "react", "angular", "vue", "tailwind", "ui design"],
        1.5,
    ),
    (
        "Backend Developer",
        &["node.js", "python", "java", "sql", "nosql", "api", "docker", "aws", "microservices"],
        1.5,
    ),
    (
        "Full Stack Developer",
        &["react", "node.js", "sql", "api", "docker", "aws", "html", "css", "javascript", "git"],
        2.0,
    ),
    (
        "Data Scientist",
        &[
            "python", "machine learning", "deep learning", "pandas", "scikit-learn", "sql",
            "statistics", "data visualization",
        ],
        1.8,
    ),
    (
        "Project Manager",
        &["agile", "scrum", "jira", "project planning", "risk management", "stakeholder management"],
        1.2,
    ),
    (
        "UI/UX Designer",
        &["figma", "user research", "wireframing", "prototyping", "ui design", "ux design"],
        1.2,
    ),
];

/// Sample resume offered to first-time users.
pub const SAMPLE_RESUME: &str = "John Doe - Senior Full Stack Developer

Summary:
Experienced Full Stack Developer with over 8 years of experience in building scalable web applications. Proficient in JavaScript, React, Node.js, and Python. Proven ability to lead projects from conception to deployment on AWS. Passionate about clean code and agile methodologies.

Experience:
Lead Developer, Tech Solutions Inc. (2018 - Present)
- Led a team of 5 developers in an agile environment using Jira and Scrum.
- Architected and developed a microservices-based e-commerce platform using React, Node.js, and Docker.
- Managed database design and implementation with PostgreSQL and MongoDB.
- Implemented CI/CD pipelines on AWS, reducing deployment time by 40%.

Skills:
- Languages: JavaScript, TypeScript, Python, SQL
- Frontend: React, Redux, HTML5, CSS3, Tailwind CSS
- Backend: Node.js, Express.js, Django
- Databases: PostgreSQL, MongoDB, Redis
- DevOps: AWS, Docker, Kubernetes, Git, CI/CD
- Project Management: Agile, Scrum, Jira";
