pub mod auth;
pub mod banners;
pub mod faqs;
pub mod packages;
pub mod projects;
pub mod services;
pub mod stats;
pub mod testimonials;
pub mod upload;
pub mod users;
