use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("Settings file:    {}", settings_path().display());
    println!("log_level:        {}", settings.log_level);
    println!("currency_symbol:  {}", settings.currency_symbol);
    println!("top_categories:   {}", settings.top_categories);
    println!("export_dir:       {}", settings.export_dir);
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Set {key}.");
    Ok(())
}
