use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, util::MonotonicClock};

mod aggregation;
mod records;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    multi_tenant: bool,
    lenient_dates: bool,
    clock: MonotonicClock,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Round-trip to the store to check the connection is alive.
    pub async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }

    /// Resolve the owner filter for a call.
    ///
    /// Multi-tenant deployments never run without an owner; single-tenant
    /// deployments ignore it so owned and unowned records are never mixed.
    fn scope<'a>(&self, owner: Option<&'a str>) -> ResultEngine<Option<&'a str>> {
        if !self.multi_tenant {
            return Ok(None);
        }
        owner
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(Some)
            .ok_or_else(|| EngineError::MissingParameter("email is required".to_string()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    multi_tenant: bool,
    lenient_dates: bool,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Scope every operation to the caller email.
    pub fn multi_tenant(mut self, multi_tenant: bool) -> EngineBuilder {
        self.multi_tenant = multi_tenant;
        self
    }

    /// Store unparsable dates as given instead of rejecting them.
    pub fn lenient_dates(mut self, lenient_dates: bool) -> EngineBuilder {
        self.lenient_dates = lenient_dates;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            multi_tenant: self.multi_tenant,
            lenient_dates: self.lenient_dates,
            clock: MonotonicClock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_tenant_ignores_owner() {
        let engine = Engine::builder().build().await.unwrap();
        assert_eq!(engine.scope(Some("alice@example.com")).unwrap(), None);
        assert_eq!(engine.scope(None).unwrap(), None);
    }

    #[tokio::test]
    async fn multi_tenant_requires_owner() {
        let engine = Engine::builder().multi_tenant(true).build().await.unwrap();
        assert_eq!(
            engine.scope(Some(" alice@example.com ")).unwrap(),
            Some("alice@example.com")
        );
        assert!(matches!(
            engine.scope(None),
            Err(EngineError::MissingParameter(_))
        ));
        assert!(matches!(
            engine.scope(Some("  ")),
            Err(EngineError::MissingParameter(_))
        ));
    }
}
