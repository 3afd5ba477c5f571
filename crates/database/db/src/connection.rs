/// The [`DatabaseConnectionProvider`] trait provides a way to get a connection to the database.
/// This is implemented by the [`crate::Database`] and [`crate::DatabaseTransaction`] types.
pub trait DatabaseConnectionProvider {
    /// The type of the underlying connection.
    type Connection: sea_orm::ConnectionTrait + Sync;

    /// Returns a reference to the database connection.
    fn get_connection(&self) -> &Self::Connection;
}
