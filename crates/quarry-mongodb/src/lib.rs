mod filter;
mod op;
mod pipeline;
mod value;

use quarry_core::{
    async_trait,
    driver::{operation::Operation, Capability, Driver, Response},
    Error, Result,
};

use mongodb::{Client, Database};
use tokio::sync::OnceCell;
use url::Url;

/// Document adapter backed by MongoDB.
///
/// Owns one client per named connection. The client is established lazily
/// and exactly once; [`Driver::connect`] is idempotent.
#[derive(Debug)]
pub struct MongoDb {
    url: Url,
    inner: OnceCell<Inner>,
}

#[derive(Debug)]
struct Inner {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoDb {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::adapter)?;

        if url.scheme() != "mongodb" {
            return Err(quarry_core::err!(
                "connection URL does not have a `mongodb` scheme; url={url_str}"
            ));
        }

        Ok(Self {
            url,
            inner: OnceCell::new(),
        })
    }

    async fn inner(&self) -> Result<&Inner> {
        self.inner
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(self.url.as_str())
                    .await
                    .map_err(Error::adapter)?;

                let db_name = self
                    .url
                    .path()
                    .trim_start_matches('/')
                    .split('?')
                    .next()
                    .filter(|name| !name.is_empty())
                    .unwrap_or("quarry");

                let database = client.database(db_name);

                tracing::debug!(target: "quarry::mongodb", database = db_name, "connected");
                Ok(Inner { client, database })
            })
            .await
    }

    pub(crate) async fn database(&self) -> Result<&Database> {
        Ok(&self.inner().await?.database)
    }
}

#[async_trait]
impl Driver for MongoDb {
    fn capability(&self) -> &'static Capability {
        &Capability::MONGODB
    }

    async fn connect(&self) -> Result<()> {
        self.inner().await.map(|_| ())
    }

    fn is_connected(&self) -> bool {
        self.inner.initialized()
    }

    async fn exec(&self, op: Operation) -> Result<Response> {
        op::execute_operation(self, op)
            .await
            .inspect_err(|err| {
                tracing::error!(target: "quarry::mongodb", %err, "operation failed");
            })
    }
}
