use super::driver::{DatabaseDriver, RecoveryModel};
use crate::backup::BackupKind;
use crate::config::SqlServerConfig;
use crate::error::{BackupError, Result};
use async_trait::async_trait;
use std::path::Path;
use tiberius::{AuthMethod, Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

const APPLICATION_NAME: &str = "mssql-s3-backup";

/// Parsed form of `sqlserver.server`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: Option<u16>,
    pub instance: Option<String>,
}

impl ServerAddress {
    pub fn parse(server: &str) -> Result<Self> {
        let server = server.trim();
        let (host, port) = match server.rsplit_once(',') {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|_| {
                    BackupError::Config(format!("invalid port in sqlserver.server '{}'", server))
                })?;
                (host.trim(), Some(port))
            }
            None => (server, None),
        };
        let (host, instance) = match host.split_once('\\') {
            Some((host, instance)) => (host, Some(instance.to_string())),
            None => (host, None),
        };
        let host = match host {
            "." | "(local)" => "localhost",
            other => other,
        };

        if host.is_empty() || instance.as_deref() == Some("") {
            return Err(BackupError::Config(format!(
                "invalid sqlserver.server '{}'",
                server
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            instance,
        })
    }
}

/// Bracket-quotes an identifier, doubling any closing bracket.
fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn backup_statement(database: &str, kind: BackupKind) -> String {
    let target = match kind {
        BackupKind::Full => "DATABASE",
        BackupKind::Incremental => "LOG",
    };
    format!("BACKUP {} {} TO DISK = @P1", target, quote_ident(database))
}

pub struct MssqlDriver {
    address: ServerAddress,
    config: SqlServerConfig,
    client: Option<Client<Compat<TcpStream>>>,
}

impl MssqlDriver {
    pub fn new(config: &SqlServerConfig) -> Result<Self> {
        Ok(Self {
            address: ServerAddress::parse(&config.server)?,
            config: config.clone(),
            client: None,
        })
    }

    fn client_config(&self) -> Result<Config> {
        let mut config = Config::new();
        config.host(&self.address.host);
        if let Some(port) = self.address.port {
            config.port(port);
        }
        if let Some(instance) = &self.address.instance {
            config.instance_name(instance);
        }
        config.application_name(APPLICATION_NAME);
        config.authentication(self.auth_method()?);
        if self.config.trust_server_certificate {
            config.trust_cert();
        }
        Ok(config)
    }

    fn auth_method(&self) -> Result<AuthMethod> {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(password)) => Ok(AuthMethod::sql_server(user, password)),
            (Some(_), None) | (None, Some(_)) => Err(BackupError::Config(
                "sqlserver.username and sqlserver.password must be set together".to_string(),
            )),
            #[cfg(windows)]
            (None, None) => Ok(AuthMethod::Integrated),
            #[cfg(not(windows))]
            (None, None) => Err(BackupError::Config(
                "sqlserver.username and sqlserver.password are required on this platform"
                    .to_string(),
            )),
        }
    }

    fn connect_error(&self, err: std::io::Error) -> BackupError {
        BackupError::Database(format!("failed to connect to {}: {}", self.config.server, err))
    }

    fn client(&mut self) -> Result<&mut Client<Compat<TcpStream>>> {
        self.client
            .as_mut()
            .ok_or_else(|| BackupError::Database("not connected".to_string()))
    }
}

#[async_trait]
impl DatabaseDriver for MssqlDriver {
    async fn connect(&mut self) -> Result<()> {
        let config = self.client_config()?;
        info!("Connecting to SQL Server {}", self.config.server);

        let tcp = if self.address.instance.is_some() {
            TcpStream::connect_named(&config).await?
        } else {
            TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| self.connect_error(e))?
        };
        tcp.set_nodelay(true).map_err(|e| self.connect_error(e))?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        self.client = Some(client);
        debug!("Connected to {}", self.config.server);
        Ok(())
    }

    async fn recovery_model(&mut self, database: &str) -> Result<Option<RecoveryModel>> {
        let client = self.client()?;
        let row = client
            .query(
                "SELECT recovery_model_desc FROM sys.databases WHERE name = @P1",
                &[&database],
            )
            .await?
            .into_row()
            .await?;

        let model = match row {
            Some(row) => {
                let desc: Option<&str> = row.try_get(0)?;
                Some(RecoveryModel::from_desc(desc.unwrap_or_default()))
            }
            None => None,
        };
        debug!("Recovery model of {}: {:?}", database, model);
        Ok(model)
    }

    async fn backup(&mut self, database: &str, kind: BackupKind, target: &Path) -> Result<()> {
        let statement = backup_statement(database, kind);
        let target = target.to_string_lossy().to_string();
        info!("Running {} backup of {} to {}", kind, database, target);

        let client = self.client()?;
        client.execute(statement, &[&target.as_str()]).await?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
            debug!("Disconnected from {}", self.config.server);
        }
        Ok(())
    }

    fn engine_name(&self) -> &'static str {
        "SQL Server"
    }
}
