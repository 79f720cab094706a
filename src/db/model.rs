use chrono::NaiveDateTime;

use crate::db::schema::{activities, buildings, organizations};
use crate::model;

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "buildings"]
pub struct Building {
    pub id: i32,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "buildings"]
pub struct NewBuilding {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Building {
    pub fn into_client(self) -> model::Building {
        model::Building {
            id: self.id,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "activities"]
pub struct Activity {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "activities"]
pub struct NewActivity {
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Activity {
    pub fn into_client(self) -> model::Activity {
        model::Activity {
            id: self.id,
            name: self.name,
            parent_id: self.parent_id,
            children: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn into_client_with_children(self, children: Vec<Activity>) -> model::Activity {
        model::Activity {
            children: Some(children.into_iter().map(Activity::into_client).collect()),
            ..self.into_client()
        }
    }
}

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "organizations"]
pub struct Organization {
    pub id: i32,
    pub name: String,
    /// JSON-encoded array of phone number strings.
    pub phone_numbers: String,
    pub building_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Insertable)]
#[table_name = "organizations"]
pub struct NewOrganization {
    pub name: String,
    pub phone_numbers: String,
    pub building_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Organization {
    pub fn into_client(self) -> model::Organization {
        let phone_numbers = serde_json::from_str(&self.phone_numbers).unwrap_or_default();
        model::Organization {
            id: self.id,
            name: self.name,
            phone_numbers,
            building_id: self.building_id,
            building: None,
            activities: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
