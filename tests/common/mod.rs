#![allow(dead_code)]

use defquill::document::parser::parse_document;
use defquill::document::store::Snapshot;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const ITEMS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Defs>
  <ThingDef Name="ResourceBase" Abstract="True">
    <category>Item</category>
    <stackLimit>75</stackLimit>
    <statBases>
      <MaxHitPoints>100</MaxHitPoints>
      <Mass>0.5</Mass>
    </statBases>
  </ThingDef>
  <ThingDef Name="ResourceVerbBase" ParentName="ResourceBase" Abstract="True">
    <alwaysHaulable>true</alwaysHaulable>
  </ThingDef>
  <ThingDef ParentName="ResourceVerbBase">
    <defName>Steel</defName>
    <label>steel</label>
    <description>Refined metal.</description>
    <statBases>
      <Mass>0.25</Mass>
      <MarketValue>1.9</MarketValue>
    </statBases>
    <stuffProps>
      <commonality>0.9</commonality>
      <color>(0.6,0.6,0.6)</color>
      <constructEffect>ConstructMetal</constructEffect>
      <categories>
        <li>Metallic</li>
      </categories>
      <statFactors>
        <MaxHitPoints>1</MaxHitPoints>
        <Beauty>0.5</Beauty>
      </statFactors>
      <statOffsets>
        <Beauty>0</Beauty>
      </statOffsets>
    </stuffProps>
  </ThingDef>
  <ThingDef ParentName="ResourceBase">
    <defName>WoodLog</defName>
    <label>wood</label>
    <stuffProps>
      <color>(133,97,67)</color>
      <statOffsets>
        <Beauty>-1</Beauty>
      </statOffsets>
    </stuffProps>
  </ThingDef>
  <ThingDef ParentName="ResourceBase">
    <defName>WoodPlank</defName>
    <label>wood plank</label>
  </ThingDef>
  <ThingDef ParentName="GhostBase">
    <defName>Orphan</defName>
    <label>orphan thing</label>
    <statBases>
      <Mass>3</Mass>
    </statBases>
  </ThingDef>
</Defs>
"#;

pub const STATS_XML: &str = r#"<Defs>
  <StatDef>
    <defName>MaxHitPoints</defName>
    <label>max hit points</label>
  </StatDef>
  <StatDef>
    <defName>Mass</defName>
    <label>mass</label>
  </StatDef>
</Defs>
"#;

/// Builds an in-memory zip archive from `(entry name, contents)` pairs.
pub fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                .unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// The standard fixture archive, with some non-definition entries mixed in.
pub fn core_archive() -> Vec<u8> {
    archive(&[
        ("Defs/", ""),
        ("Defs/Items.xml", ITEMS_XML),
        ("Defs/readme.txt", "not a definition"),
        ("Defs/Stats.xml", STATS_XML),
    ])
}

/// Parses `(id, xml)` pairs straight into a snapshot.
pub fn snapshot(documents: &[(&str, &str)]) -> Snapshot {
    Snapshot::new(
        documents
            .iter()
            .map(|(id, xml)| parse_document(id, xml).unwrap())
            .collect(),
    )
}

pub fn core_snapshot() -> Snapshot {
    snapshot(&[("Defs/Items.xml", ITEMS_XML), ("Defs/Stats.xml", STATS_XML)])
}
