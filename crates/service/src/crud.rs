//! The paged CRUD contract every resource service implements.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[async_trait]
pub trait CrudService: Send + Sync + 'static {
    type Dto: Serialize + Send;
    type CreateInput: DeserializeOwned + Send + 'static;
    type UpdateInput: DeserializeOwned + Send + 'static;
    type ListQuery: DeserializeOwned + Send + 'static;

    async fn create(&self, ctx: &RequestContext, input: Self::CreateInput) -> Result<Self::Dto, ServiceError>;
    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Self::Dto, ServiceError>;
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: Self::UpdateInput) -> Result<Self::Dto, ServiceError>;
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), ServiceError>;
    async fn list(
        &self,
        ctx: &RequestContext,
        query: Self::ListQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<Self::Dto>, ServiceError>;
}

/// Resources listed under a parent, e.g. `/projects/{id}/duties`.
#[async_trait]
pub trait ChildListing: CrudService {
    /// Fails with `NotFound` when the parent is not visible to the caller.
    async fn list_for_parent(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        query: Self::ListQuery,
        pagination: Pagination,
        sorting: Option<&str>,
    ) -> Result<Page<Self::Dto>, ServiceError>;
}

/// Deserialize a field that distinguishes "absent" from `null`:
/// absent stays `None` (via `#[serde(default)]`), `null` becomes `Some(None)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        team_id: Option<Option<Uuid>>,
    }

    #[test]
    fn nullable_distinguishes_absent_and_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.team_id, None);
        let cleared: Patch = serde_json::from_str(r#"{"team_id":null}"#).unwrap();
        assert_eq!(cleared.team_id, Some(None));
        let id = Uuid::new_v4();
        let set: Patch = serde_json::from_str(&format!(r#"{{"team_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.team_id, Some(Some(id)));
    }
}
