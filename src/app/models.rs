//! Rows read from the database.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub tags: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub created_at: String,
}

impl Listing {
    /// Field values as the listing form shows them.
    pub fn form_values(&self) -> BTreeMap<String, String> {
        let fields = [
            ("title", Some(&self.title)),
            ("description", self.description.as_ref()),
            ("salary", self.salary.as_ref()),
            ("tags", self.tags.as_ref()),
            ("company", self.company.as_ref()),
            ("address", self.address.as_ref()),
            ("city", self.city.as_ref()),
            ("state", self.state.as_ref()),
            ("phone", self.phone.as_ref()),
            ("email", self.email.as_ref()),
            ("requirements", self.requirements.as_ref()),
            ("benefits", self.benefits.as_ref()),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub password: String,
}
