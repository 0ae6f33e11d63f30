pub mod booking;
pub mod contact;
pub mod document;

pub use booking::{Booking, BookingRef, BookingStatus, CancelRequest, NewBooking, Slot};
pub use contact::{Contact, NewContact, NewSubscriber};
pub use document::StoreDocument;
