//! Connection settings for SQL Server.

use tiberius::{AuthMethod, Config, EncryptionLevel};

/// Connection settings for one SQL Server instance.
#[derive(Debug, Clone)]
pub struct MssqlConfig {
    /// Host name or address.
    pub host: String,
    /// TCP port, 1433 on a default instance.
    pub port: u16,
    /// Database to connect to.
    pub database: String,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Negotiate TLS for the connection.
    pub encrypt: bool,
    /// Accept the server certificate without validation.
    pub trust_server_certificate: bool,
}

impl MssqlConfig {
    /// Settings for a default local instance with SQL authentication.
    #[must_use]
    pub fn new(
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1433,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            encrypt: true,
            trust_server_certificate: false,
        }
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Disables TLS negotiation. For servers without a usable
    /// certificate, such as local containers.
    #[must_use]
    pub fn without_encryption(mut self) -> Self {
        self.encrypt = false;
        self
    }

    /// Accepts whatever certificate the server presents.
    #[must_use]
    pub fn trust_server_certificate(mut self) -> Self {
        self.trust_server_certificate = true;
        self
    }

    pub(crate) fn to_tiberius(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        if self.encrypt {
            config.encryption(EncryptionLevel::Required);
            if self.trust_server_certificate {
                config.trust_cert();
            }
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }
        config
    }
}
