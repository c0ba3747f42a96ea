use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub release_id: Uuid,
    pub position: i32,
    pub title: String,
    pub version: Option<String>,
    pub main_artist: Option<String>,
    pub feat_artists: Option<String>,
    pub composer: String,
    pub lyricist: Option<String>,
    pub instrumental: bool,
    pub ffp: bool,
    pub explicit: bool,
    pub file_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::release::Entity",
        from = "Column::ReleaseId",
        to = "super::release::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Release,
    #[sea_orm(has_many = "super::track_stat::Entity")]
    TrackStats,
}

impl Related<super::release::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Release.def()
    }
}

impl Related<super::track_stat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackStats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
