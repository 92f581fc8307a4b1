use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    groupfold::app::run_gen_kfold(std::env::args().skip(1))
}
