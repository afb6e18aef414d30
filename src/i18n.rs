// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Static English/Spanish string table for the tool windows.
//!
//! Deliberately minimal: a language enum detected from the environment and
//! a lookup keyed by identifier. Missing Spanish entries fall back to
//! English; for a key absent from both tables, [`tr`] yields an empty
//! string and [`tr_or_key`] echoes the key so the gap shows up in the UI.

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    /// Detect from `LC_ALL`/`LC_MESSAGES`/`LANG`, defaulting to English.
    pub fn from_env() -> Self {
        for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    return Self::from_locale(&value);
                }
            }
        }
        Lang::En
    }

    /// Map a locale string like `es_ES.UTF-8` to a language.
    pub fn from_locale(locale: &str) -> Self {
        if locale.to_lowercase().starts_with("es") {
            Lang::Es
        } else {
            Lang::En
        }
    }
}

/// Look up a UI string. Falls back to English, then to the key itself.
pub fn tr(lang: Lang, key: &str) -> &'static str {
    lookup(lang, key)
        .or_else(|| lookup(Lang::En, key))
        .unwrap_or("")
}

/// Like [`tr`] but returns the key when no translation exists, which is
/// what the windows want for labels.
pub fn tr_or_key<'a>(lang: Lang, key: &'a str) -> &'a str {
    match lookup(lang, key).or_else(|| lookup(Lang::En, key)) {
        Some(s) => s,
        None => key,
    }
}

fn lookup(lang: Lang, key: &str) -> Option<&'static str> {
    match lang {
        Lang::En => match key {
            "audio_config" => Some("Audio Configuration"),
            "sample_rate" => Some("Sample Rate (Hz)"),
            "buffer_size" => Some("Buffer Size (samples)"),
            "sample_format" => Some("Sample Format"),
            "output_device" => Some("Default Output Device"),
            "input_device" => Some("Default Input Device"),
            "no_devices" => Some("No devices found"),
            "apply" => Some("Apply"),
            "close" => Some("Close"),
            "config_applied" => Some("Configuration Applied"),
            "config_applied_msg" => {
                Some("Audio configuration has been saved and applied.\nPipeWire has been restarted.")
            }
            "restarting" => Some("Restarting PipeWire..."),
            "error" => Some("Error"),
            "check_updates" => Some("Check for Updates"),
            "install_updates" => Some("Install Updates"),
            "checking" => Some("Checking for updates..."),
            "updating" => Some("Installing updates..."),
            "up_to_date" => Some("System is up to date"),
            "updates_available" => Some("updates available"),
            "update_success" => Some("Updates installed successfully"),
            "mastering_not_found" => Some("Matchering Not Installed"),
            "mastering_install_msg" => {
                Some("Matchering is required for audio mastering.\nWould you like to install it now?")
            }
            "installing" => Some("Installing Matchering..."),
            "processing" => Some("Processing..."),
            _ => None,
        },
        Lang::Es => match key {
            "audio_config" => Some("Configuración de Audio"),
            "sample_rate" => Some("Frecuencia de Muestreo (Hz)"),
            "buffer_size" => Some("Tamaño de Buffer (samples)"),
            "sample_format" => Some("Formato de Muestra"),
            "output_device" => Some("Dispositivo de Salida Predeterminado"),
            "input_device" => Some("Dispositivo de Entrada Predeterminado"),
            "no_devices" => Some("No se encontraron dispositivos"),
            "apply" => Some("Aplicar"),
            "close" => Some("Cerrar"),
            "config_applied" => Some("Configuración Aplicada"),
            "config_applied_msg" => {
                Some("La configuración de audio se ha guardado y aplicado.\nPipeWire ha sido reiniciado.")
            }
            "restarting" => Some("Reiniciando PipeWire..."),
            "error" => Some("Error"),
            "check_updates" => Some("Buscar Actualizaciones"),
            "install_updates" => Some("Instalar Actualizaciones"),
            "checking" => Some("Buscando actualizaciones..."),
            "updating" => Some("Instalando actualizaciones..."),
            "up_to_date" => Some("El sistema está actualizado"),
            "updates_available" => Some("actualizaciones disponibles"),
            "update_success" => Some("Actualizaciones instaladas correctamente"),
            "mastering_not_found" => Some("Matchering No Instalado"),
            "mastering_install_msg" => {
                Some("Matchering es necesario para la masterización de audio.\n¿Deseas instalarlo ahora?")
            }
            "installing" => Some("Instalando Matchering..."),
            "processing" => Some("Procesando..."),
            _ => None,
        },
    }
}
