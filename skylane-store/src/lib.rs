pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod payment_repo;
pub mod ticket_repo;

pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use payment_repo::StorePaymentRepository;
pub use ticket_repo::StoreTicketRepository;
