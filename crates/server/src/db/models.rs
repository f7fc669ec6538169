use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Category labels shared by portfolio projects and FAQs.
pub const CATEGORIES: [&str; 5] = [
    "Logo Design",
    "Web Development",
    "Company Profile",
    "Social Media",
    "Desain Lainnya",
];

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: String,
    pub price: String,
    pub image: String,
    pub features: Json<Vec<String>>,
    pub accent: String,
    pub border_color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServicePackage {
    pub id: String,
    pub service_id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub features: Json<Vec<String>>,
    pub is_popular: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image: String,
    pub description: String,
    pub client: String,
    pub completion_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub message: String,
    pub rating: i64,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Banner {
    pub id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
