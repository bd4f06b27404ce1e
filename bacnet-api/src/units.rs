//! Engineering units

use crate::macros::define_enumeration;

define_enumeration! {
    /// Engineering unit of an analog quantity
    pub struct EngineeringUnits(u16);
    SQUARE_METERS = 0 => "squareMeters",
    SQUARE_FEET = 1 => "squareFeet",
    MILLIAMPERES = 2 => "milliamperes",
    AMPERES = 3 => "amperes",
    OHMS = 4 => "ohms",
    VOLTS = 5 => "volts",
    KILOVOLTS = 6 => "kilovolts",
    MEGAVOLTS = 7 => "megavolts",
    VOLT_AMPERES = 8 => "voltAmperes",
    KILOVOLT_AMPERES = 9 => "kilovoltAmperes",
    MEGAVOLT_AMPERES = 10 => "megavoltAmperes",
    VOLT_AMPERES_REACTIVE = 11 => "voltAmperesReactive",
    KILOVOLT_AMPERES_REACTIVE = 12 => "kilovoltAmperesReactive",
    MEGAVOLT_AMPERES_REACTIVE = 13 => "megavoltAmperesReactive",
    DEGREES_PHASE = 14 => "degreesPhase",
    POWER_FACTOR = 15 => "powerFactor",
    JOULES = 16 => "joules",
    KILOJOULES = 17 => "kilojoules",
    WATT_HOURS = 18 => "wattHours",
    KILOWATT_HOURS = 19 => "kilowattHours",
    BTUS = 20 => "btus",
    THERMS = 21 => "therms",
    TON_HOURS = 22 => "tonHours",
    JOULES_PER_KILOGRAM_DRY_AIR = 23 => "joulesPerKilogramDryAir",
    BTUS_PER_POUND_DRY_AIR = 24 => "btusPerPoundDryAir",
    CYCLES_PER_HOUR = 25 => "cyclesPerHour",
    CYCLES_PER_MINUTE = 26 => "cyclesPerMinute",
    HERTZ = 27 => "hertz",
    GRAMS_OF_WATER_PER_KILOGRAM_DRY_AIR = 28 => "gramsOfWaterPerKilogramDryAir",
    PERCENT_RELATIVE_HUMIDITY = 29 => "percentRelativeHumidity",
    MILLIMETERS = 30 => "millimeters",
    METERS = 31 => "meters",
    INCHES = 32 => "inches",
    FEET = 33 => "feet",
    WATTS_PER_SQUARE_FOOT = 34 => "wattsPerSquareFoot",
    WATTS_PER_SQUARE_METER = 35 => "wattsPerSquareMeter",
    LUMENS = 36 => "lumens",
    LUXES = 37 => "luxes",
    FOOT_CANDLES = 38 => "footCandles",
    KILOGRAMS = 39 => "kilograms",
    POUNDS_MASS = 40 => "poundsMass",
    TONS = 41 => "tons",
    KILOGRAMS_PER_SECOND = 42 => "kilogramsPerSecond",
    KILOGRAMS_PER_MINUTE = 43 => "kilogramsPerMinute",
    KILOGRAMS_PER_HOUR = 44 => "kilogramsPerHour",
    POUNDS_MASS_PER_MINUTE = 45 => "poundsMassPerMinute",
    POUNDS_MASS_PER_HOUR = 46 => "poundsMassPerHour",
    WATTS = 47 => "watts",
    KILOWATTS = 48 => "kilowatts",
    MEGAWATTS = 49 => "megawatts",
    BTUS_PER_HOUR = 50 => "btusPerHour",
    HORSEPOWER = 51 => "horsepower",
    TONS_REFRIGERATION = 52 => "tonsRefrigeration",
    PASCALS = 53 => "pascals",
    KILOPASCALS = 54 => "kilopascals",
    BARS = 55 => "bars",
    POUNDS_FORCE_PER_SQUARE_INCH = 56 => "poundsForcePerSquareInch",
    CENTIMETERS_OF_WATER = 57 => "centimetersOfWater",
    INCHES_OF_WATER = 58 => "inchesOfWater",
    MILLIMETERS_OF_MERCURY = 59 => "millimetersOfMercury",
    CENTIMETERS_OF_MERCURY = 60 => "centimetersOfMercury",
    INCHES_OF_MERCURY = 61 => "inchesOfMercury",
    DEGREES_CELSIUS = 62 => "degreesCelsius",
    DEGREES_KELVIN = 63 => "degreesKelvin",
    DEGREES_FAHRENHEIT = 64 => "degreesFahrenheit",
    DEGREE_DAYS_CELSIUS = 65 => "degreeDaysCelsius",
    DEGREE_DAYS_FAHRENHEIT = 66 => "degreeDaysFahrenheit",
    YEARS = 67 => "years",
    MONTHS = 68 => "months",
    WEEKS = 69 => "weeks",
    DAYS = 70 => "days",
    HOURS = 71 => "hours",
    MINUTES = 72 => "minutes",
    SECONDS = 73 => "seconds",
    METERS_PER_SECOND = 74 => "metersPerSecond",
    KILOMETERS_PER_HOUR = 75 => "kilometersPerHour",
    FEET_PER_SECOND = 76 => "feetPerSecond",
    FEET_PER_MINUTE = 77 => "feetPerMinute",
    MILES_PER_HOUR = 78 => "milesPerHour",
    CUBIC_FEET = 79 => "cubicFeet",
    CUBIC_METERS = 80 => "cubicMeters",
    IMPERIAL_GALLONS = 81 => "imperialGallons",
    LITERS = 82 => "liters",
    US_GALLONS = 83 => "usGallons",
    CUBIC_FEET_PER_MINUTE = 84 => "cubicFeetPerMinute",
    CUBIC_METERS_PER_SECOND = 85 => "cubicMetersPerSecond",
    IMPERIAL_GALLONS_PER_MINUTE = 86 => "imperialGallonsPerMinute",
    LITERS_PER_SECOND = 87 => "litersPerSecond",
    LITERS_PER_MINUTE = 88 => "litersPerMinute",
    US_GALLONS_PER_MINUTE = 89 => "usGallonsPerMinute",
    DEGREES_ANGULAR = 90 => "degreesAngular",
    DEGREES_CELSIUS_PER_HOUR = 91 => "degreesCelsiusPerHour",
    DEGREES_CELSIUS_PER_MINUTE = 92 => "degreesCelsiusPerMinute",
    DEGREES_FAHRENHEIT_PER_HOUR = 93 => "degreesFahrenheitPerHour",
    DEGREES_FAHRENHEIT_PER_MINUTE = 94 => "degreesFahrenheitPerMinute",
    NO_UNITS = 95 => "noUnits",
    PARTS_PER_MILLION = 96 => "partsPerMillion",
    PARTS_PER_BILLION = 97 => "partsPerBillion",
    PERCENT = 98 => "percent",
    PERCENT_PER_SECOND = 99 => "percentPerSecond",
    PER_MINUTE = 100 => "perMinute",
    PER_SECOND = 101 => "perSecond",
    PSI_PER_DEGREE_FAHRENHEIT = 102 => "psiPerDegreeFahrenheit",
    RADIANS = 103 => "radians",
    REVOLUTIONS_PER_MINUTE = 104 => "revolutionsPerMinute",
    CURRENCY1 = 105 => "currency1",
    CURRENCY2 = 106 => "currency2",
    CURRENCY3 = 107 => "currency3",
    CURRENCY4 = 108 => "currency4",
    CURRENCY5 = 109 => "currency5",
    CURRENCY6 = 110 => "currency6",
    CURRENCY7 = 111 => "currency7",
    CURRENCY8 = 112 => "currency8",
    CURRENCY9 = 113 => "currency9",
    CURRENCY10 = 114 => "currency10",
    SQUARE_INCHES = 115 => "squareInches",
    SQUARE_CENTIMETERS = 116 => "squareCentimeters",
    BTUS_PER_POUND = 117 => "btusPerPound",
    CENTIMETERS = 118 => "centimeters",
    POUNDS_MASS_PER_SECOND = 119 => "poundsMassPerSecond",
    DELTA_DEGREES_FAHRENHEIT = 120 => "deltaDegreesFahrenheit",
    DELTA_DEGREES_KELVIN = 121 => "deltaDegreesKelvin",
    KILOHMS = 122 => "kilohms",
    MEGOHMS = 123 => "megohms",
    MILLIVOLTS = 124 => "millivolts",
    KILOJOULES_PER_KILOGRAM = 125 => "kilojoulesPerKilogram",
    MEGAJOULES = 126 => "megajoules",
    JOULES_PER_DEGREE_KELVIN = 127 => "joulesPerDegreeKelvin",
    JOULES_PER_KILOGRAM_DEGREE_KELVIN = 128 => "joulesPerKilogramDegreeKelvin",
    KILOHERTZ = 129 => "kilohertz",
    MEGAHERTZ = 130 => "megahertz",
    PER_HOUR = 131 => "perHour",
    MILLIWATTS = 132 => "milliwatts",
    HECTOPASCALS = 133 => "hectopascals",
    MILLIBARS = 134 => "millibars",
    CUBIC_METERS_PER_HOUR = 135 => "cubicMetersPerHour",
    LITERS_PER_HOUR = 136 => "litersPerHour",
    KILOWATT_HOURS_PER_SQUARE_METER = 137 => "kilowattHoursPerSquareMeter",
    KILOWATT_HOURS_PER_SQUARE_FOOT = 138 => "kilowattHoursPerSquareFoot",
    MEGAJOULES_PER_SQUARE_METER = 139 => "megajoulesPerSquareMeter",
    MEGAJOULES_PER_SQUARE_FOOT = 140 => "megajoulesPerSquareFoot",
    WATTS_PER_SQUARE_METER_DEGREE_KELVIN = 141 => "wattsPerSquareMeterDegreeKelvin",
    CUBIC_FEET_PER_SECOND = 142 => "cubicFeetPerSecond",
    PERCENT_OBSCURATION_PER_FOOT = 143 => "percentObscurationPerFoot",
    PERCENT_OBSCURATION_PER_METER = 144 => "percentObscurationPerMeter",
    MILLIOHMS = 145 => "milliohms",
    MEGAWATT_HOURS = 146 => "megawattHours",
    KILO_BTUS = 147 => "kiloBtus",
    MEGA_BTUS = 148 => "megaBtus",
    KILOJOULES_PER_KILOGRAM_DRY_AIR = 149 => "kilojoulesPerKilogramDryAir",
    MEGAJOULES_PER_KILOGRAM_DRY_AIR = 150 => "megajoulesPerKilogramDryAir",
    KILOJOULES_PER_DEGREE_KELVIN = 151 => "kilojoulesPerDegreeKelvin",
    MEGAJOULES_PER_DEGREE_KELVIN = 152 => "megajoulesPerDegreeKelvin",
    NEWTON = 153 => "newton",
    GRAMS_PER_SECOND = 154 => "gramsPerSecond",
    GRAMS_PER_MINUTE = 155 => "gramsPerMinute",
    TONS_PER_HOUR = 156 => "tonsPerHour",
    KILO_BTUS_PER_HOUR = 157 => "kiloBtusPerHour",
    HUNDREDTHS_SECONDS = 158 => "hundredthsSeconds",
    MILLISECONDS = 159 => "milliseconds",
    NEWTON_METERS = 160 => "newtonMeters",
    MILLIMETERS_PER_SECOND = 161 => "millimetersPerSecond",
    MILLIMETERS_PER_MINUTE = 162 => "millimetersPerMinute",
    METERS_PER_MINUTE = 163 => "metersPerMinute",
    METERS_PER_HOUR = 164 => "metersPerHour",
    CUBIC_METERS_PER_MINUTE = 165 => "cubicMetersPerMinute",
    METERS_PER_SECOND_PER_SECOND = 166 => "metersPerSecondPerSecond",
    AMPERES_PER_METER = 167 => "amperesPerMeter",
    AMPERES_PER_SQUARE_METER = 168 => "amperesPerSquareMeter",
    AMPERE_SQUARE_METERS = 169 => "ampereSquareMeters",
    FARADS = 170 => "farads",
    HENRYS = 171 => "henrys",
    OHM_METERS = 172 => "ohmMeters",
    SIEMENS = 173 => "siemens",
    SIEMENS_PER_METER = 174 => "siemensPerMeter",
    TESLAS = 175 => "teslas",
    VOLTS_PER_DEGREE_KELVIN = 176 => "voltsPerDegreeKelvin",
    VOLTS_PER_METER = 177 => "voltsPerMeter",
    WEBERS = 178 => "webers",
    CANDELAS = 179 => "candelas",
    CANDELAS_PER_SQUARE_METER = 180 => "candelasPerSquareMeter",
    DEGREES_KELVIN_PER_HOUR = 181 => "degreesKelvinPerHour",
    DEGREES_KELVIN_PER_MINUTE = 182 => "degreesKelvinPerMinute",
    JOULE_SECONDS = 183 => "jouleSeconds",
    RADIANS_PER_SECOND = 184 => "radiansPerSecond",
    SQUARE_METERS_PER_NEWTON = 185 => "squareMetersPerNewton",
    KILOGRAMS_PER_CUBIC_METER = 186 => "kilogramsPerCubicMeter",
    NEWTON_SECONDS = 187 => "newtonSeconds",
    NEWTONS_PER_METER = 188 => "newtonsPerMeter",
    WATTS_PER_METER_PER_DEGREE_KELVIN = 189 => "wattsPerMeterPerDegreeKelvin",
    MICROSIEMENS = 190 => "microsiemens",
    CUBIC_FEET_PER_HOUR = 191 => "cubicFeetPerHour",
    US_GALLONS_PER_HOUR = 192 => "usGallonsPerHour",
    KILOMETERS = 193 => "kilometers",
    MICROMETERS = 194 => "micrometers",
    GRAMS = 195 => "grams",
    MILLIGRAMS = 196 => "milligrams",
    MILLILITERS = 197 => "milliliters",
    MILLILITERS_PER_SECOND = 198 => "millilitersPerSecond",
    DECIBELS = 199 => "decibels",
    DECIBELS_MILLIVOLT = 200 => "decibelsMillivolt",
    DECIBELS_VOLT = 201 => "decibelsVolt",
    MILLISIEMENS = 202 => "millisiemens",
    WATT_HOURS_REACTIVE = 203 => "wattHoursReactive",
    KILOWATT_HOURS_REACTIVE = 204 => "kilowattHoursReactive",
    MEGAWATT_HOURS_REACTIVE = 205 => "megawattHoursReactive",
    MILLIMETERS_OF_WATER = 206 => "millimetersOfWater",
    PER_MILLE = 207 => "perMille",
    GRAMS_PER_GRAM = 208 => "gramsPerGram",
    KILOGRAMS_PER_KILOGRAM = 209 => "kilogramsPerKilogram",
    GRAMS_PER_KILOGRAM = 210 => "gramsPerKilogram",
    MILLIGRAMS_PER_GRAM = 211 => "milligramsPerGram",
    MILLIGRAMS_PER_KILOGRAM = 212 => "milligramsPerKilogram",
    GRAMS_PER_MILLILITER = 213 => "gramsPerMilliliter",
    GRAMS_PER_LITER = 214 => "gramsPerLiter",
    MILLIGRAMS_PER_LITER = 215 => "milligramsPerLiter",
    MICROGRAMS_PER_LITER = 216 => "microgramsPerLiter",
    GRAMS_PER_CUBIC_METER = 217 => "gramsPerCubicMeter",
    MILLIGRAMS_PER_CUBIC_METER = 218 => "milligramsPerCubicMeter",
    MICROGRAMS_PER_CUBIC_METER = 219 => "microgramsPerCubicMeter",
    NANOGRAMS_PER_CUBIC_METER = 220 => "nanogramsPerCubicMeter",
    GRAMS_PER_CUBIC_CENTIMETER = 221 => "gramsPerCubicCentimeter",
    BECQUERELS = 222 => "becquerels",
    KILOBECQUERELS = 223 => "kilobecquerels",
    MEGABECQUERELS = 224 => "megabecquerels",
    GRAY = 225 => "gray",
    MILLIGRAY = 226 => "milligray",
    MICROGRAY = 227 => "microgray",
    SIEVERTS = 228 => "sieverts",
    MILLISIEVERTS = 229 => "millisieverts",
    MICROSIEVERTS = 230 => "microsieverts",
    MICROSIEVERTS_PER_HOUR = 231 => "microsievertsPerHour",
    DECIBELS_A = 232 => "decibelsA",
    NEPHELOMETRIC_TURBIDITY_UNIT = 233 => "nephelometricTurbidityUnit",
    PH = 234 => "pH",
    GRAMS_PER_SQUARE_METER = 235 => "gramsPerSquareMeter",
    MINUTES_PER_DEGREE_KELVIN = 236 => "minutesPerDegreeKelvin",
}

impl Default for EngineeringUnits {
    fn default() -> Self {
        Self::NO_UNITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_lookup() {
        assert_eq!(EngineeringUnits::from_name("degreesCelsius"), Some(EngineeringUnits::DEGREES_CELSIUS));
        assert_eq!(EngineeringUnits::DEGREES_CELSIUS.code(), 62);
        assert_eq!(EngineeringUnits::from_name("percent"), Some(EngineeringUnits(98)));
        assert_eq!(EngineeringUnits::from_name("celsius"), None);
    }

    #[test]
    fn test_unit_table_is_contiguous() {
        for (index, (unit, _)) in EngineeringUnits::VALUES.iter().enumerate() {
            assert_eq!(unit.code() as usize, index);
        }
    }
}
