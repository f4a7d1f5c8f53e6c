mod allocator;

use sealdir::app::App;

fn main() -> anyhow::Result<()> {
    App::init()?.execute()
}
