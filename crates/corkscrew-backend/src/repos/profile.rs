use corkscrew_common::models::{Profile, ProfileUpsert, Role};
use serde_json::json;
use uuid::Uuid;

use super::decode_first;
use crate::error::BackendResult;
use crate::query::{Query, Table};
use crate::store::{AccessScope, RecordStore};

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn get<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        id: Uuid,
    ) -> BackendResult<Option<Profile>> {
        let rows = db
            .query_records(scope, &Query::from(Table::Profiles).eq("id", id).limit(1))
            .await?;
        decode_first(rows)
    }

    pub async fn upsert<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        profile: &ProfileUpsert,
    ) -> BackendResult<()> {
        db.upsert_record(scope, Table::Profiles, "id", serde_json::to_value(profile)?)
            .await
    }

    /// Create the profile row written at sign-up, merging into an existing one
    pub async fn ensure_exists<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        id: Uuid,
        full_name: &str,
        role: Role,
    ) -> BackendResult<()> {
        db.upsert_record(
            scope,
            Table::Profiles,
            "id",
            json!({ "id": id, "full_name": full_name, "role": role }),
        )
        .await
    }
}
