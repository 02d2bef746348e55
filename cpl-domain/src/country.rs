use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ServiceError, ServiceResult};

pub type CountryId = i64;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub iso_code2: String,
    pub iso_code3: String,
    pub capital: Option<String>,
    pub phone_code: Option<String>,
    pub continent: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CountryCreate {
    pub name: String,
    pub iso_code2: String,
    pub iso_code3: String,
    pub capital: Option<String>,
    pub phone_code: Option<String>,
    pub continent: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CountryUpdate {
    pub name: Option<String>,
    pub iso_code2: Option<String>,
    pub iso_code3: Option<String>,
    pub capital: Option<String>,
    pub phone_code: Option<String>,
    pub continent: Option<String>,
}

impl CountryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.iso_code2.is_none()
            && self.iso_code3.is_none()
            && self.capital.is_none()
            && self.phone_code.is_none()
            && self.continent.is_none()
    }
}

pub type ArcCountryRepository = Arc<Box<dyn CountryRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait CountryRepository {
    async fn get_by_id(&self, id: CountryId) -> ServiceResult<Option<Country>>;
    async fn get_all(&self) -> ServiceResult<Vec<Country>>;
    async fn create(&self, country: &CountryCreate) -> ServiceResult<Country>;
    async fn update(&self, id: CountryId, update: &CountryUpdate) -> ServiceResult<Option<Country>>;
    async fn soft_delete(&self, id: CountryId) -> ServiceResult<bool>;
    async fn exists_by_id(&self, id: CountryId) -> ServiceResult<bool>;
    async fn exists_by_name(&self, name: &str) -> ServiceResult<bool>;
    async fn exists_by_iso2(&self, iso2: &str) -> ServiceResult<bool>;
    async fn exists_by_iso3(&self, iso3: &str) -> ServiceResult<bool>;
}

pub type ArcCountryService = Arc<Box<dyn CountryService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait CountryService {
    async fn get_country(&self, id: CountryId) -> ServiceResult<Country>;
    async fn get_all_countries(&self) -> ServiceResult<Vec<Country>>;
    async fn create_country(&self, request: CountryCreate) -> ServiceResult<Country>;
    async fn update_country(&self, id: CountryId, request: CountryUpdate)
    -> ServiceResult<Country>;
    async fn delete_country(&self, id: CountryId) -> ServiceResult<()>;
    async fn validate_country_exists(&self, id: CountryId) -> ServiceResult<()>;
}

pub struct CountryServiceImpl {
    country_repository: ArcCountryRepository,
}

impl CountryServiceImpl {
    pub fn new(country_repository: ArcCountryRepository) -> Self {
        Self { country_repository }
    }

    fn normalize_optional(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string())
    }
}

#[async_trait::async_trait]
impl CountryService for CountryServiceImpl {
    async fn get_country(&self, id: CountryId) -> ServiceResult<Country> {
        match self.country_repository.get_by_id(id).await? {
            Some(country) => Ok(country),
            None => ServiceError::not_found("Country not found"),
        }
    }

    async fn get_all_countries(&self) -> ServiceResult<Vec<Country>> {
        self.country_repository.get_all().await
    }

    async fn create_country(&self, request: CountryCreate) -> ServiceResult<Country> {
        let name = request.name.trim().to_string();
        let iso2 = request.iso_code2.trim().to_ascii_uppercase();
        let iso3 = request.iso_code3.trim().to_ascii_uppercase();

        if name.is_empty() {
            return ServiceError::validation("Country name is required");
        }
        if iso2.len() != 2 || !iso2.chars().all(|c| c.is_ascii_alphabetic()) {
            return ServiceError::validation("ISO Code2 must be two letters");
        }
        if iso3.len() != 3 || !iso3.chars().all(|c| c.is_ascii_alphabetic()) {
            return ServiceError::validation("ISO Code3 must be three letters");
        }

        if self.country_repository.exists_by_name(&name).await? {
            return ServiceError::conflict("Country name already exists");
        }
        if self.country_repository.exists_by_iso2(&iso2).await? {
            return ServiceError::conflict("ISO Code2 already exists");
        }
        if self.country_repository.exists_by_iso3(&iso3).await? {
            return ServiceError::conflict("ISO Code3 already exists");
        }

        let normalized = CountryCreate {
            name,
            iso_code2: iso2,
            iso_code3: iso3,
            capital: Self::normalize_optional(request.capital),
            phone_code: Self::normalize_optional(request.phone_code),
            continent: Self::normalize_optional(request.continent),
        };

        self.country_repository.create(&normalized).await
    }

    async fn update_country(
        &self,
        id: CountryId,
        request: CountryUpdate,
    ) -> ServiceResult<Country> {
        let Some(existing) = self.country_repository.get_by_id(id).await? else {
            return ServiceError::not_found("Country not found");
        };
        if request.is_empty() {
            return Ok(existing);
        }

        let mut normalized = CountryUpdate::default();

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return ServiceError::validation("Country name cannot be empty");
            }
            if name != existing.name && self.country_repository.exists_by_name(&name).await? {
                return ServiceError::conflict("Country name already exists");
            }
            normalized.name = Some(name);
        }
        if let Some(iso2) = request.iso_code2 {
            let iso2 = iso2.trim().to_ascii_uppercase();
            if iso2 != existing.iso_code2 && self.country_repository.exists_by_iso2(&iso2).await? {
                return ServiceError::conflict("ISO Code2 already exists");
            }
            normalized.iso_code2 = Some(iso2);
        }
        if let Some(iso3) = request.iso_code3 {
            let iso3 = iso3.trim().to_ascii_uppercase();
            if iso3 != existing.iso_code3 && self.country_repository.exists_by_iso3(&iso3).await? {
                return ServiceError::conflict("ISO Code3 already exists");
            }
            normalized.iso_code3 = Some(iso3);
        }
        normalized.capital = Self::normalize_optional(request.capital);
        normalized.phone_code = Self::normalize_optional(request.phone_code);
        normalized.continent = Self::normalize_optional(request.continent);

        match self.country_repository.update(id, &normalized).await? {
            Some(country) => Ok(country),
            None => ServiceError::not_found("Country not found"),
        }
    }

    async fn delete_country(&self, id: CountryId) -> ServiceResult<()> {
        if self.country_repository.get_by_id(id).await?.is_none() {
            return ServiceError::not_found("Country not found");
        }
        if !self.country_repository.soft_delete(id).await? {
            return ServiceError::not_found("Country not found");
        }
        Ok(())
    }

    async fn validate_country_exists(&self, id: CountryId) -> ServiceResult<()> {
        if !self.country_repository.exists_by_id(id).await? {
            return ServiceError::validation("Invalid nationality_id");
        }
        Ok(())
    }
}

/// Accepts any country id except the ones listed as missing.
#[derive(Default, Clone)]
pub struct MockCountryService {
    pub missing_ids: Vec<CountryId>,
}

#[async_trait::async_trait]
impl CountryService for MockCountryService {
    async fn get_country(&self, id: CountryId) -> ServiceResult<Country> {
        if self.missing_ids.contains(&id) {
            return ServiceError::not_found("Country not found");
        }
        Ok(Country {
            id,
            name: "Testland".into(),
            iso_code2: "TL".into(),
            iso_code3: "TLD".into(),
            capital: None,
            phone_code: None,
            continent: None,
        })
    }

    async fn get_all_countries(&self) -> ServiceResult<Vec<Country>> {
        Ok(vec![])
    }

    async fn create_country(&self, _request: CountryCreate) -> ServiceResult<Country> {
        ServiceError::internal("not supported by mock")
    }

    async fn update_country(
        &self,
        _id: CountryId,
        _request: CountryUpdate,
    ) -> ServiceResult<Country> {
        ServiceError::internal("not supported by mock")
    }

    async fn delete_country(&self, _id: CountryId) -> ServiceResult<()> {
        Ok(())
    }

    async fn validate_country_exists(&self, id: CountryId) -> ServiceResult<()> {
        if self.missing_ids.contains(&id) {
            return ServiceError::validation("Invalid nationality_id");
        }
        Ok(())
    }
}
