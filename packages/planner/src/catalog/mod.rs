//! Place catalog boundary.
//!
//! The catalog is read-only while an itinerary is scheduled and append-only
//! while discovery promotes candidates. Upserts are keyed on the owning
//! city and the normalized place name, so promoting the same candidate
//! twice never creates a second place.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{City, CityId, Place, Product};

pub use memory::MemoryCatalog;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalog;

#[async_trait]
pub trait PlaceCatalog: Send + Sync {
    async fn city(&self, city_id: CityId) -> Result<Option<City>>;

    /// Insert a city or replace the one with the same id.
    async fn upsert_city(&self, city: City) -> Result<City>;

    async fn places_for_city(&self, city_id: CityId) -> Result<Vec<Place>>;

    /// Insert or update a place, matching on city and normalized name.
    ///
    /// When a match exists its id is kept and its details are replaced.
    /// Returns the stored place.
    async fn upsert_place(&self, place: Place) -> Result<Place>;

    async fn products_for_city(&self, city_id: CityId) -> Result<Vec<Product>>;
}

#[async_trait]
impl<T: PlaceCatalog + ?Sized> PlaceCatalog for Arc<T> {
    async fn city(&self, city_id: CityId) -> Result<Option<City>> {
        (**self).city(city_id).await
    }

    async fn upsert_city(&self, city: City) -> Result<City> {
        (**self).upsert_city(city).await
    }

    async fn places_for_city(&self, city_id: CityId) -> Result<Vec<Place>> {
        (**self).places_for_city(city_id).await
    }

    async fn upsert_place(&self, place: Place) -> Result<Place> {
        (**self).upsert_place(place).await
    }

    async fn products_for_city(&self, city_id: CityId) -> Result<Vec<Product>> {
        (**self).products_for_city(city_id).await
    }
}
