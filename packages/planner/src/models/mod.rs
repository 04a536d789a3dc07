pub mod candidate;
pub mod itinerary;
pub mod place;
pub mod preferences;
pub mod product;

pub use candidate::CandidatePlace;
pub use itinerary::{
    GeneratedDay, GeneratedItinerary, GeneratedSlot, ItineraryMeta, ItineraryOutcome, SlotKind,
};
pub use place::{
    City, CityId, CrowdLevel, Place, PlaceDetails, PlaceId, PlaceRef, PlaceType, PriceRange,
    Setting, StayBucket, TimeOfDay, UnknownVariant, Weekday, DEFAULT_EFFORT,
};
pub use preferences::{BudgetTier, DayWindow, Party, TripPreferences};
pub use product::{Product, ProductId, UpsellSuggestion};
