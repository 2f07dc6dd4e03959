use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of one of the lookup tables (races, genders, regions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Demographic {
    pub id: i32,
    pub name: String,
}

/// The three targeting dimensions a survey can restrict on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemographicKind {
    Race,
    Gender,
    Region,
}

impl DemographicKind {
    pub const ALL: [DemographicKind; 3] = [DemographicKind::Race, DemographicKind::Gender, DemographicKind::Region];

    pub fn table(&self) -> &'static str {
        match self {
            DemographicKind::Race => "races",
            DemographicKind::Gender => "genders",
            DemographicKind::Region => "regions",
        }
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            DemographicKind::Race => "race_id",
            DemographicKind::Gender => "gender_id",
            DemographicKind::Region => "region_id",
        }
    }

    pub fn name_column(&self) -> &'static str {
        match self {
            DemographicKind::Race => "race",
            DemographicKind::Gender => "gender",
            DemographicKind::Region => "region",
        }
    }

    /// Junction table linking surveys to this dimension
    pub fn junction_table(&self) -> &'static str {
        match self {
            DemographicKind::Race => "survey_races",
            DemographicKind::Gender => "survey_genders",
            DemographicKind::Region => "survey_regions",
        }
    }

    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {id} AS id, {name} AS name FROM {table} ORDER BY {id}",
            id = self.id_column(),
            name = self.name_column(),
            table = self.table()
        )
    }

    /// Names targeted by one survey; binds $1 = survey_id
    pub fn targeted_names_sql(&self) -> String {
        format!(
            "SELECT t.{name} FROM {junction} j JOIN {table} t ON t.{id} = j.{id} \
             WHERE j.survey_id = $1 ORDER BY t.{id}",
            name = self.name_column(),
            junction = self.junction_table(),
            table = self.table(),
            id = self.id_column()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targeted_names_joins_through_junction() {
        let sql = DemographicKind::Region.targeted_names_sql();
        assert!(sql.contains("FROM survey_regions j JOIN regions t ON t.region_id = j.region_id"));
        assert!(sql.starts_with("SELECT t.region"));
    }
}
