//! In-memory catalog for tests and database-less deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PlaceCatalog;
use crate::error::Result;
use crate::models::{City, CityId, Place, Product};

/// Catalog held in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryCatalog {
    cities: RwLock<HashMap<CityId, City>>,
    places: RwLock<Vec<Place>>,
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.push(product);
    }

    pub async fn place_count(&self) -> usize {
        self.places.read().await.len()
    }
}

#[async_trait]
impl PlaceCatalog for MemoryCatalog {
    async fn city(&self, city_id: CityId) -> Result<Option<City>> {
        Ok(self.cities.read().await.get(&city_id).cloned())
    }

    async fn upsert_city(&self, city: City) -> Result<City> {
        self.cities.write().await.insert(city.id, city.clone());
        Ok(city)
    }

    async fn places_for_city(&self, city_id: CityId) -> Result<Vec<Place>> {
        Ok(self
            .places
            .read()
            .await
            .iter()
            .filter(|p| p.city_id == city_id)
            .cloned()
            .collect())
    }

    async fn upsert_place(&self, place: Place) -> Result<Place> {
        let key = place.details.normalized_name();
        let mut places = self.places.write().await;

        if let Some(existing) = places
            .iter_mut()
            .find(|p| p.city_id == place.city_id && p.details.normalized_name() == key)
        {
            existing.details = place.details;
            return Ok(existing.clone());
        }

        places.push(place.clone());
        Ok(place)
    }

    async fn products_for_city(&self, city_id: CityId) -> Result<Vec<Product>> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.city_id == city_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlaceDetails, PlaceType};

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_normalized_name() {
        let catalog = MemoryCatalog::new();
        let city = City::new("Rome", "Italy");
        catalog.upsert_city(city.clone()).await.unwrap();

        let first = catalog
            .upsert_place(Place::new(city.id, PlaceDetails::new("Bar Del Fico", PlaceType::Bar)))
            .await
            .unwrap();
        let second = catalog
            .upsert_place(Place::new(
                city.id,
                PlaceDetails::new("bar  del fico", PlaceType::Bar).with_zone("Parione"),
            ))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(catalog.place_count().await, 1);
        assert_eq!(second.details.zone.as_deref(), Some("Parione"));
    }

    #[tokio::test]
    async fn test_places_are_scoped_to_city() {
        let catalog = MemoryCatalog::new();
        let rome = CityId::new();
        let lisbon = CityId::new();
        catalog
            .upsert_place(Place::new(rome, PlaceDetails::new("Pincio", PlaceType::View)))
            .await
            .unwrap();
        catalog
            .upsert_place(Place::new(lisbon, PlaceDetails::new("Pincio", PlaceType::View)))
            .await
            .unwrap();

        assert_eq!(catalog.places_for_city(rome).await.unwrap().len(), 1);
        assert_eq!(catalog.place_count().await, 2);
        assert!(catalog.city(rome).await.unwrap().is_none());
    }
}
