fn main() {
    reflect_probe_lib::run()
}
