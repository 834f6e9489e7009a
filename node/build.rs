fn main() {
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-env-changed=INGEST_HOST");
    println!("cargo:rerun-if-env-changed=INGEST_API_KEY");

    embuild::espidf::sysenv::output();
}
