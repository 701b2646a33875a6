fn main() {
    #[cfg(feature = "labjackud")]
    println!("cargo:rustc-link-lib=LabJackUD");
    #[cfg(feature = "labjackud")]
    println!("cargo:rustc-link-search=native=C:/Program Files (x86)/LabJack/Drivers/64bit");
}
