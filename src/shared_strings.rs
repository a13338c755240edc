//! Shared-string register (spec §4.4): a deduplicated pool of text that
//! emits `sharedStrings.xml`.

use crate::error::Result;
use crate::registry::Registry;
use crate::xml_writer::XmlWriter;
use std::io::Write;

pub struct SharedStringRegister {
    registry: Registry<String>,
    total_references: u64,
}

impl SharedStringRegister {
    pub fn new() -> Self {
        SharedStringRegister {
            registry: Registry::new(),
            total_references: 0,
        }
    }

    /// Registers one occurrence of `s` (spec §4.4: `count` sums every
    /// call, including duplicates; `uniqueCount` is the distinct total).
    pub fn register(&mut self, s: &str) -> u32 {
        self.total_references += 1;
        let (index, _) = self.registry.append(s.to_string());
        index
    }

    pub fn index_of(&self, s: &str) -> Option<u32> {
        self.registry.index_of(&s.to_string())
    }

    pub fn unique_count(&self) -> usize {
        self.registry.len()
    }

    pub fn total_references(&self) -> u64 {
        self.total_references
    }

    pub fn contains(&self, s: &str) -> bool {
        self.registry.contains(&s.to_string())
    }

    pub fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        writer.start_element("sst")?;
        writer.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        writer.attribute_int("count", self.total_references as i64)?;
        writer.attribute_int("uniqueCount", self.registry.len() as i64)?;
        writer.close_start_tag()?;

        for s in self.registry.iter() {
            writer.start_element("si")?;
            writer.close_start_tag()?;
            writer.start_element("t")?;
            writer.close_start_tag()?;
            writer.write_escaped(s)?;
            writer.end_element("t")?;
            writer.end_element("si")?;
        }

        writer.end_element("sst")?;
        writer.flush()
    }
}

impl Default for SharedStringRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_dedups_and_index_of_matches() {
        let mut ss = SharedStringRegister::new();
        let i1 = ss.register("Hello");
        let i2 = ss.register("World");
        let i3 = ss.register("Hello");
        assert_eq!(i1, 0);
        assert_eq!(i2, 1);
        assert_eq!(i3, 0);
        assert_eq!(ss.index_of("Hello"), Some(0));
        assert_eq!(ss.unique_count(), 2);
        assert_eq!(ss.total_references(), 3);
    }

    #[test]
    fn boolean_fast_path_strings_never_registered() {
        let ss = SharedStringRegister::new();
        assert!(!ss.contains("1"));
        assert!(!ss.contains("0"));
    }
}
