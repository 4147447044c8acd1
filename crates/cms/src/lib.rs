pub mod destinations;
pub mod experiences;
pub mod offers;

pub use destinations::destination_slug;
pub use experiences::{Experience, ExperienceSource, NoExperiences, ScrapeFailure};
pub use offers::{FeaturedOffer, WordPressCms};
