pub mod serviced;
