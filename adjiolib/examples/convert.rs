use adjiolib::{
    formats::{csv::Csv, report::ReportText},
    traits::{ReadFormat, WriteFormat},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Пример: нормализуем отчёт (stdin -> stdout)
    let st = ReportText::read(std::io::BufReader::new(std::io::stdin()))?;
    Csv::write(std::io::stdout(), &st)?;
    Ok(())
}
