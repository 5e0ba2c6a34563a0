pub mod bridging;
