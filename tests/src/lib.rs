#![cfg(test)]

mod discovery {
    mod integration;
}
mod net {
    mod interface;
}
mod scan {
    mod integration;
}
mod utils;
