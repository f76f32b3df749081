fn main() {
    #[cfg(not(any(feature = "bincode", feature = "messagepack")))]
    compile_error!("ttl-session requires either the 'bincode' or the 'messagepack' feature");

    #[cfg(all(feature = "bincode", feature = "messagepack"))]
    compile_error!("Cannot enable both 'bincode' and 'messagepack' features simultaneously");
}
