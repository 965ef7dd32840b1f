pub mod ebay;
pub mod http;
pub mod listings;
pub mod store;
pub mod supabase;
