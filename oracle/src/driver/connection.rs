//! Connection wrapper and session initialization.

use sqljson_core::prelude::{Connection, Dialect, Features, LikeVariant, Query};
use tracing::{debug, info};

use super::cursor::{FormatStylePlaceholderCursor, Params};
use super::DriverConnection;
use crate::error::{OracleResult, wrap_oracle_errors};
use crate::types::Param;

/// Statement cache size set on every new connection.
pub const STMT_CACHE_SIZE: u32 = 20;

/// Succeeds only when the server accepts `LIKE TRANSLATE(... USING NCHAR_CS)`.
const LIKE_TRANSLATE_CHECK: &str = r"SELECT 1 FROM DUAL WHERE DUMMY LIKE TRANSLATE(%s USING NCHAR_CS) ESCAPE TRANSLATE('\' USING NCHAR_CS)";

/// Connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleSettings {
    pub host: String,
    pub port: Option<u16>,
    /// SID, or a full connect descriptor when no port is set.
    pub name: String,
    pub user: String,
    pub password: String,
    /// Store timestamps in UTC.
    pub use_tz: bool,
}

impl OracleSettings {
    /// Connect descriptor for the driver.
    pub fn dsn(&self) -> String {
        match self.port {
            Some(port) => {
                let host = match self.host.trim() {
                    "" => "localhost",
                    host => host,
                };
                format!(
                    "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={})(PORT={}))(CONNECT_DATA=(SID={})))",
                    host, port, self.name
                )
            }
            None => self.name.clone(),
        }
    }

    /// `user/"password"@dsn`
    pub fn connect_string(&self) -> String {
        format!("{}/\"{}\"@{}", self.user, self.password, self.dsn())
    }
}

/// Opens adapter connections and remembers which LIKE form the server takes.
#[derive(Debug, Clone)]
pub struct OracleDatabase {
    settings: OracleSettings,
    like_variant: Option<LikeVariant>,
}

impl OracleDatabase {
    pub fn new(settings: OracleSettings) -> Self {
        Self {
            settings,
            like_variant: None,
        }
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    /// LIKE form found by the first connection, if one was opened.
    pub fn like_variant(&self) -> Option<LikeVariant> {
        self.like_variant
    }

    /// Wrap a freshly opened driver connection and initialize its session.
    /// The LIKE form is only detected on the first connection.
    pub fn connect<D: DriverConnection>(&mut self, driver: D) -> OracleResult<OracleConnection<D>> {
        let conn = OracleConnection::open(driver, self.settings.use_tz, self.like_variant)?;
        self.like_variant = Some(conn.features.like_variant);
        Ok(conn)
    }
}

/// An initialized Oracle session.
pub struct OracleConnection<D: DriverConnection> {
    driver: D,
    use_tz: bool,
    features: Features,
}

impl<D: DriverConnection> OracleConnection<D> {
    /// Initialize the session on `driver`. A known `like_variant` skips the
    /// LIKE check.
    pub fn open(driver: D, use_tz: bool, like_variant: Option<LikeVariant>) -> OracleResult<Self> {
        let mut conn = Self {
            driver,
            use_tz,
            features: Features::for_dialect(Dialect::Oracle),
        };
        conn.init_connection_state(like_variant)?;
        Ok(conn)
    }

    fn init_connection_state(&mut self, like_variant: Option<LikeVariant>) -> OracleResult<()> {
        let mut cursor = self.cursor()?;
        cursor.execute("ALTER SESSION SET NLS_TERRITORY = 'AMERICA'", None)?;
        // fixed formats so datetimes round-trip as text
        cursor.execute(
            &format!(
                "ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD HH24:MI:SS' \
                 NLS_TIMESTAMP_FORMAT = 'YYYY-MM-DD HH24:MI:SS.FF'{}",
                if self.use_tz { " TIME_ZONE = 'UTC'" } else { "" }
            ),
            None,
        )?;
        cursor.close()?;

        self.features.like_variant = match like_variant {
            Some(variant) => variant,
            None => self.detect_like_variant()?,
        };

        self.driver.set_stmt_cache_size(STMT_CACHE_SIZE);
        // keep the session changes even without autocommit
        if !self.driver.autocommit() {
            self.commit()?;
        }
        info!(like_variant = ?self.features.like_variant, use_tz = self.use_tz, "oracle session ready");
        Ok(())
    }

    fn detect_like_variant(&mut self) -> OracleResult<LikeVariant> {
        let mut cursor = self.cursor()?;
        let outcome = cursor.execute(LIKE_TRANSLATE_CHECK, Some(&Params::positional(["X"])));
        cursor.close()?;
        match outcome {
            Ok(()) => Ok(LikeVariant::Standard),
            Err(err) if err.is_database_error() => {
                debug!(error = %err, "LIKE TRANSLATE rejected, using LIKEC");
                Ok(LikeVariant::Likec)
            }
            Err(err) => Err(err),
        }
    }

    /// Compilation target for lookups on this session.
    pub fn connection(&self) -> Connection {
        Connection::with_features(Dialect::Oracle, self.features)
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn cursor(&mut self) -> OracleResult<FormatStylePlaceholderCursor<D::Cursor>> {
        Ok(FormatStylePlaceholderCursor::new(self.driver.cursor()?, self.use_tz))
    }

    /// Compile `query` for this session and execute it.
    pub fn execute_query(
        &mut self,
        query: &Query,
    ) -> OracleResult<FormatStylePlaceholderCursor<D::Cursor>> {
        let fragment = query.to_sql(&self.connection())?;
        let params = fragment
            .params
            .iter()
            .map(Param::try_from)
            .collect::<OracleResult<Vec<_>>>()?;
        let mut cursor = self.cursor()?;
        cursor.execute(&fragment.sql, Some(&Params::Positional(params)))?;
        Ok(cursor)
    }

    pub fn commit(&mut self) -> OracleResult<()> {
        self.driver.commit().map_err(wrap_oracle_errors)
    }

    pub fn rollback(&mut self) -> OracleResult<()> {
        self.driver.rollback().map_err(wrap_oracle_errors)
    }

    pub fn autocommit(&self) -> bool {
        self.driver.autocommit()
    }

    pub fn set_autocommit(&mut self, on: bool) -> OracleResult<()> {
        Ok(self.driver.set_autocommit(on)?)
    }

    /// Check every deferred constraint now, then defer them again.
    pub fn check_constraints(&mut self) -> OracleResult<()> {
        let mut cursor = self.cursor()?;
        cursor.execute("SET CONSTRAINTS ALL IMMEDIATE", None)?;
        cursor.execute("SET CONSTRAINTS ALL DEFERRED", None)?;
        cursor.close()
    }

    /// Whether the server still answers.
    pub fn is_usable(&mut self) -> bool {
        self.driver.ping().is_ok()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }
}
