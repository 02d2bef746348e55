use cpl_domain::{
    ServiceError, ServiceResult,
    country::{Country, CountryCreate, CountryRepository, CountryUpdate},
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

pub struct MySqlCountryRepository {
    pool: Pool<MySql>,
}

impl MySqlCountryRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn country_from_row(row: &MySqlRow) -> ServiceResult<Country> {
        Ok(Country {
            id: row.try_get("Id").map_err(db_err)?,
            name: row.try_get("Name").map_err(db_err)?,
            iso_code2: row.try_get("IsoCode2").map_err(db_err)?,
            iso_code3: row.try_get("IsoCode3").map_err(db_err)?,
            capital: row.try_get("Capital").map_err(db_err)?,
            phone_code: row.try_get("PhoneCode").map_err(db_err)?,
            continent: row.try_get("Continent").map_err(db_err)?,
        })
    }

    async fn exists_where(&self, condition: &str, value: &str) -> ServiceResult<bool> {
        let query = format!(
            "SELECT 1 FROM tblCountries WHERE {} = ? AND Void = 0 LIMIT 1",
            condition
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }
}

#[async_trait::async_trait]
impl CountryRepository for MySqlCountryRepository {
    async fn get_by_id(&self, id: i64) -> ServiceResult<Option<Country>> {
        let row = sqlx::query(
            "SELECT Id, Name, IsoCode2, IsoCode3, Capital, PhoneCode, Continent \
             FROM tblCountries WHERE Id = ? AND Void = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| Self::country_from_row(&r)).transpose()
    }

    async fn get_all(&self) -> ServiceResult<Vec<Country>> {
        let rows = sqlx::query(
            "SELECT Id, Name, IsoCode2, IsoCode3, Capital, PhoneCode, Continent \
             FROM tblCountries WHERE Void = 0",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(Self::country_from_row).collect()
    }

    async fn create(&self, country: &CountryCreate) -> ServiceResult<Country> {
        let result = sqlx::query(
            "INSERT INTO tblCountries (Name, IsoCode2, IsoCode3, Capital, PhoneCode, Continent) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&country.name)
        .bind(&country.iso_code2)
        .bind(&country.iso_code3)
        .bind(&country.capital)
        .bind(&country.phone_code)
        .bind(&country.continent)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        match self.get_by_id(result.last_insert_id() as i64).await? {
            Some(created) => Ok(created),
            None => ServiceError::internal("Inserted country row not readable"),
        }
    }

    async fn update(&self, id: i64, update: &CountryUpdate) -> ServiceResult<Option<Country>> {
        let mut sets = Vec::new();
        if update.name.is_some() {
            sets.push("Name = ?");
        }
        if update.iso_code2.is_some() {
            sets.push("IsoCode2 = ?");
        }
        if update.iso_code3.is_some() {
            sets.push("IsoCode3 = ?");
        }
        if update.capital.is_some() {
            sets.push("Capital = ?");
        }
        if update.phone_code.is_some() {
            sets.push("PhoneCode = ?");
        }
        if update.continent.is_some() {
            sets.push("Continent = ?");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query_str = format!(
            "UPDATE tblCountries SET {} WHERE Id = ? AND Void = 0",
            sets.join(", ")
        );
        let mut query = sqlx::query(&query_str);
        for value in [
            &update.name,
            &update.iso_code2,
            &update.iso_code3,
            &update.capital,
            &update.phone_code,
            &update.continent,
        ]
        .into_iter()
        .flatten()
        {
            query = query.bind(value);
        }
        query = query.bind(id);
        query.execute(&self.pool).await.map_err(db_err)?;

        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE tblCountries SET Void = 1 WHERE Id = ? AND Void = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_id(&self, id: i64) -> ServiceResult<bool> {
        let row = sqlx::query("SELECT 1 FROM tblCountries WHERE Id = ? AND Void = 0 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }

    async fn exists_by_name(&self, name: &str) -> ServiceResult<bool> {
        self.exists_where("Name", name).await
    }

    async fn exists_by_iso2(&self, iso2: &str) -> ServiceResult<bool> {
        self.exists_where("IsoCode2", iso2).await
    }

    async fn exists_by_iso3(&self, iso3: &str) -> ServiceResult<bool> {
        self.exists_where("IsoCode3", iso3).await
    }
}
