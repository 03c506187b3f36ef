//! Translation of a program into an Arduino sketch for the bench
//! controller. `G1`, `G2` and `G3` lines become calls to three helper
//! routines; their literals are copied as written.

use std::path::{Path, PathBuf};

use crate::error::{Result, SimError};
use crate::program::Program;

const SKETCH_HEADER: &str = r#"
// Dichiarazione delle funzioni
void blink(int x, int y, int z);
void turnOnPin(int pin, int duration);
void turnOnAnalogPin(int pin, int duration);

// Configurazione iniziale
void setup() {
  pinMode(13, OUTPUT);  // Pin per il controllo
  Serial.begin(115200);  // Inizializza la comunicazione seriale
}

// Funzioni di utilità
void blink(int x, int y, int z) {
  int onTime = y * 1000;  // Converti in millisecondi
  int offTime = z * 1000; // Converti in millisecondi

  for (int i = 0; i < x; i++) {
    digitalWrite(13, HIGH); // Accendi il pin
    delay(onTime);          // Aspetta il tempo di accensione
    digitalWrite(13, LOW);  // Spegni il pin
    delay(offTime);         // Aspetta il tempo di spegnimento
  }
}

void turnOnPin(int pin, int duration) {
  pinMode(pin, OUTPUT);
  digitalWrite(pin, HIGH);
  delay(duration * 1000); // Converti in millisecondi
  digitalWrite(pin, LOW);
}

void turnOnAnalogPin(int pin, int duration) {
  pinMode(pin, OUTPUT);
  analogWrite(pin, 255); // Imposta il valore analogico massimo
  delay(duration * 1000); // Converti in millisecondi
  analogWrite(pin, 0); // Spegni il pin analogico
}

void loop() {
"#;

const SKETCH_FOOTER: &str = "\n}\n";

pub const SKETCH_EXTENSION: &str = "ino";

/// Last `<letter><text>` token on the line, as written. Empty literals
/// count as missing.
fn literal<'a>(parts: &[&'a str], letter: char) -> Option<&'a str> {
    parts
        .iter()
        .rev()
        .find_map(|p| p.strip_prefix(letter))
        .filter(|l| !l.is_empty())
}

/// Body line for one source line, if it maps to a controller call.
/// Matching is on the raw text, so literals need not be numbers.
pub fn device_call(line: &str) -> Option<String> {
    let line = line.trim();
    let parts: Vec<&str> = line.split_whitespace().collect();
    if line.starts_with("G1") {
        let (x, y, z) = (
            literal(&parts, 'X')?,
            literal(&parts, 'Y')?,
            literal(&parts, 'Z')?,
        );
        Some(format!("  blink({x}, {y}, {z});\n"))
    } else if line.starts_with("G2") {
        let (pin, secs) = (literal(&parts, 'X')?, literal(&parts, 'Y')?);
        Some(format!("  turnOnPin({pin}, {secs});\n"))
    } else if line.starts_with("G3") {
        let (pin, secs) = (literal(&parts, 'X')?, literal(&parts, 'Y')?);
        Some(format!("  turnOnAnalogPin({pin}, {secs});\n"))
    } else {
        None
    }
}

pub fn translate(program: &Program) -> String {
    let mut out = String::from(SKETCH_HEADER);
    for call in program.lines().iter().filter_map(|l| device_call(&l.text)) {
        out.push_str(&call);
    }
    out.push_str(SKETCH_FOOTER);
    out
}

/// `<dir>/<stem>/<stem>.ino`, the layout the Arduino toolchain expects.
pub fn sketch_path(program_path: &Path) -> PathBuf {
    let stem = program_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let dir = program_path.parent().unwrap_or_else(|| Path::new(""));
    let mut file = PathBuf::from(&stem);
    file.set_extension(SKETCH_EXTENSION);
    dir.join(&stem).join(file)
}

/// Translates the program at `program_path` and writes the sketch next to it.
pub fn write_sketch(program_path: &Path) -> Result<PathBuf> {
    let program = Program::load(program_path)?;
    let target = sketch_path(program_path);
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| SimError::io(dir, e))?;
    }
    std::fs::write(&target, translate(&program)).map_err(|e| SimError::io(&target, e))?;
    console_log!("Program translated and saved to {}", target.display());
    Ok(target)
}
