use cookbook::Cookbook;

use crate::Result;

pub(crate) fn validate() -> Result<()> {
    let cookbook = Cookbook::from_static_dir()?;

    cookbook.validate()?;

    println!("Static data Valid! ✅");

    Ok(())
}
