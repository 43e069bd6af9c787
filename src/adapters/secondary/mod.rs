pub mod firestore;
pub mod google;
