//! Service wiring: picks the stores, builds the domain services once.

use std::sync::Arc;

use anyhow::Context;

use supplydesk_auth::{
    IdentityService, IdentitySettings, Role, SUPPLIER_POLICIES, TokenIssuer, UserClaim, UserStore,
};
use supplydesk_infra::{
    BootstrapAdmin, InMemorySupplierRepository, InMemoryUserStore, PostgresSupplierRepository,
    PostgresUserStore, Settings, db,
};
use supplydesk_suppliers::{SupplierRepository, SupplierService};

pub type SupplierStore = Arc<dyn SupplierRepository>;
pub type CredentialStore = Arc<dyn UserStore>;

/// Everything handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub suppliers: SupplierService<SupplierStore>,
    pub identity: IdentityService<CredentialStore>,
}

impl AppServices {
    pub fn new(
        suppliers: SupplierStore,
        users: CredentialStore,
        identity: IdentitySettings,
    ) -> Self {
        Self {
            suppliers: SupplierService::new(suppliers),
            identity: IdentityService::new(users, identity),
        }
    }

    /// Hermetic wiring for dev/test: nothing survives a restart.
    pub fn in_memory(identity: IdentitySettings) -> Self {
        Self::new(
            Arc::new(InMemorySupplierRepository::new()),
            Arc::new(InMemoryUserStore::new()),
            identity,
        )
    }

    /// Production wiring: Postgres when `DATABASE_URL` is set, else in-memory.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let services = match &settings.database {
            Some(database) => {
                let pool = db::connect(database).await?;
                db::ensure_schema(&pool).await?;
                tracing::info!("using Postgres stores");
                Self::new(
                    Arc::new(PostgresSupplierRepository::new(pool.clone())),
                    Arc::new(PostgresUserStore::new(pool)),
                    settings.identity.clone(),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                Self::in_memory(settings.identity.clone())
            }
        };

        if let Some(admin) = &settings.bootstrap_admin {
            services.seed_admin(admin).await?;
        }
        Ok(services)
    }

    /// Ensure the bootstrap account exists and holds every supplier claim.
    pub async fn seed_admin(&self, admin: &BootstrapAdmin) -> anyhow::Result<()> {
        let claims: Vec<UserClaim> = SUPPLIER_POLICIES
            .iter()
            .map(|p| UserClaim::new(p.required_claim, "true"))
            .collect();

        self.identity
            .ensure_account(&admin.email, &admin.password, &claims)
            .await
            .context("failed to seed bootstrap admin")?;
        self.identity
            .grant_role(&admin.email, Role::admin())
            .await
            .context("failed to grant admin role")?;

        tracing::info!(email = %admin.email, "bootstrap admin ready");
        Ok(())
    }

    pub fn tokens(&self) -> Arc<TokenIssuer> {
        Arc::new(self.identity.tokens().clone())
    }
}
