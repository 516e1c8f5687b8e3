fn main() {
    if let Err(err) = route_topo_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
