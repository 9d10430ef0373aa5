pub mod cancel;
pub mod classic;
pub mod config;
pub mod dh;
pub mod errors;
pub mod knapsack;
pub mod preset;
pub mod prime;
pub mod ring;
pub mod rsa;
pub mod trithemius;
