//! Row builders for query tests.
//!
//! Each builder has a `Default` describing an unremarkable row, so a test
//! only spells out the fields its query filters on. [`Fixture::load`]
//! writes the rows as CSV files and loads them the same way the CLI does.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crash_analysis_config::InputPaths;
use crash_analysis_models::TableName;

use crate::CrashTables;

#[derive(Debug, Clone)]
pub struct Person {
    pub crash: u32,
    pub gender: &'static str,
    pub severity: &'static str,
    pub airbag: &'static str,
    pub ethnicity: &'static str,
    pub license: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
    pub deaths: u32,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            crash: 0,
            gender: "MALE",
            severity: "NOT INJURED",
            airbag: "DEPLOYED",
            ethnicity: "WHITE",
            license: "DRIVER LICENSE",
            state: "Texas",
            zip: "78701",
            deaths: 0,
        }
    }
}

const PERSON_HEADER: &str = "CRASH_ID,UNIT_NBR,PRSN_GNDR_ID,PRSN_INJRY_SEV_ID,PRSN_AIRBAG_ID,\
PRSN_ETHNICITY_ID,DRVR_LIC_TYPE_ID,DRVR_LIC_STATE_ID,DRVR_ZIP,DEATH_CNT";

impl Person {
    fn csv(&self) -> String {
        format!(
            "{},1,{},{},{},{},{},{},{},{}",
            self.crash,
            self.gender,
            self.severity,
            self.airbag,
            self.ethnicity,
            self.license,
            self.state,
            self.zip,
            self.deaths
        )
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub crash: u32,
    pub body: &'static str,
    pub make: &'static str,
    pub hit_and_run: &'static str,
    pub color: &'static str,
    pub state: &'static str,
    pub scale_1: &'static str,
    pub scale_2: &'static str,
    pub insurance: &'static str,
    pub factor_1: &'static str,
    pub factor_2: &'static str,
    pub injuries: &'static str,
    pub deaths: &'static str,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            crash: 0,
            body: "PASSENGER CAR",
            make: "FORD",
            hit_and_run: "N",
            color: "WHITE",
            state: "TX",
            scale_1: "NA",
            scale_2: "NA",
            insurance: "NA",
            factor_1: "NA",
            factor_2: "NA",
            injuries: "0",
            deaths: "0",
        }
    }
}

const UNIT_HEADER: &str = "CRASH_ID,UNIT_NBR,VEH_BODY_STYL_ID,VEH_MAKE_ID,VEH_HNR_FL,\
VEH_COLOR_ID,VEH_LIC_STATE_ID,VEH_DMAG_SCL_1_ID,VEH_DMAG_SCL_2_ID,FIN_RESP_TYPE_ID,\
CONTRIB_FACTR_1_ID,CONTRIB_FACTR_2_ID,TOT_INJRY_CNT,DEATH_CNT";

impl Unit {
    fn csv(&self) -> String {
        format!(
            "{},1,{},{},{},{},{},{},{},{},{},{},{},{}",
            self.crash,
            self.body,
            self.make,
            self.hit_and_run,
            self.color,
            self.state,
            self.scale_1,
            self.scale_2,
            self.insurance,
            self.factor_1,
            self.factor_2,
            self.injuries,
            self.deaths
        )
    }
}

#[derive(Debug, Clone)]
pub struct Charge {
    pub crash: u32,
    pub charge: &'static str,
}

#[derive(Debug, Clone)]
pub struct Damage {
    pub crash: u32,
    pub property: &'static str,
}

/// CSV text per input table. Tables a test does not set hold a single
/// default row for crash 0.
#[derive(Debug, Clone)]
pub struct Fixture {
    files: BTreeMap<TableName, String>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
        }
        .people(&[Person::default()])
        .units(&[Unit::default()])
        .charges(&[Charge {
            crash: 0,
            charge: "DWI",
        }])
        .damages(&[Damage {
            crash: 0,
            property: "FENCE",
        }])
        .raw(TableName::Endorse, "CRASH_ID,UNIT_NBR\n0,1\n")
        .raw(TableName::Restrict, "CRASH_ID,UNIT_NBR\n0,1\n")
    }
}

fn table_text(header: &str, rows: impl Iterator<Item = String>) -> String {
    let mut text = format!("{header}\n");
    for row in rows {
        text.push_str(&row);
        text.push('\n');
    }
    text
}

impl Fixture {
    pub fn people(self, rows: &[Person]) -> Self {
        self.raw(
            TableName::PrimaryPerson,
            &table_text(PERSON_HEADER, rows.iter().map(Person::csv)),
        )
    }

    pub fn units(self, rows: &[Unit]) -> Self {
        self.raw(
            TableName::Units,
            &table_text(UNIT_HEADER, rows.iter().map(Unit::csv)),
        )
    }

    pub fn charges(self, rows: &[Charge]) -> Self {
        self.raw(
            TableName::Charges,
            &table_text(
                "CRASH_ID,UNIT_NBR,PRSN_NBR,CHARGE",
                rows.iter().map(|c| format!("{},1,1,{}", c.crash, c.charge)),
            ),
        )
    }

    pub fn damages(self, rows: &[Damage]) -> Self {
        self.raw(
            TableName::Damages,
            &table_text(
                "CRASH_ID,DAMAGED_PROPERTY",
                rows.iter().map(|d| format!("{},{}", d.crash, d.property)),
            ),
        )
    }

    pub fn raw(mut self, table: TableName, text: &str) -> Self {
        self.files.insert(table, text.to_owned());
        self
    }

    /// Writes the tables under a directory unique to `name` and loads them.
    pub fn load(&self, name: &str) -> CrashTables {
        let dir = scratch(name);
        let mut paths = BTreeMap::new();
        for (table, text) in &self.files {
            let path = dir.join(format!("{table}.csv"));
            std::fs::write(&path, text).unwrap();
            paths.insert(*table, path);
        }
        CrashTables::load(&InputPaths::new(paths).unwrap()).unwrap()
    }
}

pub fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("crash_analysis_fixtures")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Accumulates crashes with fresh ids, starting at 1.
#[derive(Debug, Default)]
pub struct Crashes {
    people: Vec<Person>,
    units: Vec<Unit>,
    charges: Vec<Charge>,
    last: u32,
}

impl Crashes {
    fn next(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    /// `n` crashes with one unit and one person each.
    pub fn add(&mut self, n: usize, unit: &Unit, person: &Person) -> &mut Self {
        for _ in 0..n {
            let crash = self.next();
            self.units.push(Unit {
                crash,
                ..unit.clone()
            });
            self.people.push(Person {
                crash,
                ..person.clone()
            });
        }
        self
    }

    /// `n` crashes with one unit each and nobody recorded.
    pub fn add_units(&mut self, n: usize, unit: &Unit) -> &mut Self {
        for _ in 0..n {
            let crash = self.next();
            self.units.push(Unit {
                crash,
                ..unit.clone()
            });
        }
        self
    }

    /// `n` crashes with one unit, one person and one charge each.
    pub fn add_charged(
        &mut self,
        n: usize,
        charge: &'static str,
        unit: &Unit,
        person: &Person,
    ) -> &mut Self {
        for _ in 0..n {
            let crash = self.next();
            self.charges.push(Charge { crash, charge });
            self.units.push(Unit {
                crash,
                ..unit.clone()
            });
            self.people.push(Person {
                crash,
                ..person.clone()
            });
        }
        self
    }

    /// A fixture holding these crashes. Tables with no rows keep the
    /// default row.
    pub fn fixture(&self) -> Fixture {
        let mut fixture = Fixture::default();
        if !self.people.is_empty() {
            fixture = fixture.people(&self.people);
        }
        if !self.units.is_empty() {
            fixture = fixture.units(&self.units);
        }
        if !self.charges.is_empty() {
            fixture = fixture.charges(&self.charges);
        }
        fixture
    }
}
