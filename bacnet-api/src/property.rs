//! Property identifiers
//!
//! The full enumerated property-identifier space of the protocol, as one
//! static table. Channel addresses name properties by their camelCase
//! protocol name (`presentValue`, `lowLimit`, ...); lookup is exact and
//! case-sensitive. Codes the standard leaves unassigned or deleted have no
//! name and can never be addressed by name.

use crate::macros::define_enumeration;

define_enumeration! {
    /// Identifier of an object property
    pub struct PropertyIdentifier(u32);
    ACKED_TRANSITIONS = 0 => "ackedTransitions",
    ACK_REQUIRED = 1 => "ackRequired",
    ACTION = 2 => "action",
    ACTION_TEXT = 3 => "actionText",
    ACTIVE_TEXT = 4 => "activeText",
    ACTIVE_VT_SESSIONS = 5 => "activeVtSessions",
    ALARM_VALUE = 6 => "alarmValue",
    ALARM_VALUES = 7 => "alarmValues",
    ALL = 8 => "all",
    ALL_WRITES_SUCCESSFUL = 9 => "allWritesSuccessful",
    APDU_SEGMENT_TIMEOUT = 10 => "apduSegmentTimeout",
    APDU_TIMEOUT = 11 => "apduTimeout",
    APPLICATION_SOFTWARE_VERSION = 12 => "applicationSoftwareVersion",
    ARCHIVE = 13 => "archive",
    BIAS = 14 => "bias",
    CHANGE_OF_STATE_COUNT = 15 => "changeOfStateCount",
    CHANGE_OF_STATE_TIME = 16 => "changeOfStateTime",
    NOTIFICATION_CLASS = 17 => "notificationClass",
    CONTROLLED_VARIABLE_REFERENCE = 19 => "controlledVariableReference",
    CONTROLLED_VARIABLE_UNITS = 20 => "controlledVariableUnits",
    CONTROLLED_VARIABLE_VALUE = 21 => "controlledVariableValue",
    COV_INCREMENT = 22 => "covIncrement",
    DATE_LIST = 23 => "dateList",
    DAYLIGHT_SAVINGS_STATUS = 24 => "daylightSavingsStatus",
    DEADBAND = 25 => "deadband",
    DERIVATIVE_CONSTANT = 26 => "derivativeConstant",
    DERIVATIVE_CONSTANT_UNITS = 27 => "derivativeConstantUnits",
    DESCRIPTION = 28 => "description",
    DESCRIPTION_OF_HALT = 29 => "descriptionOfHalt",
    DEVICE_ADDRESS_BINDING = 30 => "deviceAddressBinding",
    DEVICE_TYPE = 31 => "deviceType",
    EFFECTIVE_PERIOD = 32 => "effectivePeriod",
    ELAPSED_ACTIVE_TIME = 33 => "elapsedActiveTime",
    ERROR_LIMIT = 34 => "errorLimit",
    EVENT_ENABLE = 35 => "eventEnable",
    EVENT_STATE = 36 => "eventState",
    EVENT_TYPE = 37 => "eventType",
    EXCEPTION_SCHEDULE = 38 => "exceptionSchedule",
    FAULT_VALUES = 39 => "faultValues",
    FEEDBACK_VALUE = 40 => "feedbackValue",
    FILE_ACCESS_METHOD = 41 => "fileAccessMethod",
    FILE_SIZE = 42 => "fileSize",
    FILE_TYPE = 43 => "fileType",
    FIRMWARE_REVISION = 44 => "firmwareRevision",
    HIGH_LIMIT = 45 => "highLimit",
    INACTIVE_TEXT = 46 => "inactiveText",
    IN_PROCESS = 47 => "inProcess",
    INSTANCE_OF = 48 => "instanceOf",
    INTEGRAL_CONSTANT = 49 => "integralConstant",
    INTEGRAL_CONSTANT_UNITS = 50 => "integralConstantUnits",
    LIMIT_ENABLE = 52 => "limitEnable",
    LIST_OF_GROUP_MEMBERS = 53 => "listOfGroupMembers",
    LIST_OF_OBJECT_PROPERTY_REFERENCES = 54 => "listOfObjectPropertyReferences",
    LOCAL_DATE = 56 => "localDate",
    LOCAL_TIME = 57 => "localTime",
    LOCATION = 58 => "location",
    LOW_LIMIT = 59 => "lowLimit",
    MANIPULATED_VARIABLE_REFERENCE = 60 => "manipulatedVariableReference",
    MAXIMUM_OUTPUT = 61 => "maximumOutput",
    MAX_APDU_LENGTH_ACCEPTED = 62 => "maxApduLengthAccepted",
    MAX_INFO_FRAMES = 63 => "maxInfoFrames",
    MAX_MASTER = 64 => "maxMaster",
    MAX_PRES_VALUE = 65 => "maxPresValue",
    MINIMUM_OFF_TIME = 66 => "minimumOffTime",
    MINIMUM_ON_TIME = 67 => "minimumOnTime",
    MINIMUM_OUTPUT = 68 => "minimumOutput",
    MIN_PRES_VALUE = 69 => "minPresValue",
    MODEL_NAME = 70 => "modelName",
    MODIFICATION_DATE = 71 => "modificationDate",
    NOTIFY_TYPE = 72 => "notifyType",
    NUMBER_OF_APDU_RETRIES = 73 => "numberOfApduRetries",
    NUMBER_OF_STATES = 74 => "numberOfStates",
    OBJECT_IDENTIFIER = 75 => "objectIdentifier",
    OBJECT_LIST = 76 => "objectList",
    OBJECT_NAME = 77 => "objectName",
    OBJECT_PROPERTY_REFERENCE = 78 => "objectPropertyReference",
    OBJECT_TYPE = 79 => "objectType",
    OPTIONAL = 80 => "optional",
    OUT_OF_SERVICE = 81 => "outOfService",
    OUTPUT_UNITS = 82 => "outputUnits",
    EVENT_PARAMETERS = 83 => "eventParameters",
    POLARITY = 84 => "polarity",
    PRESENT_VALUE = 85 => "presentValue",
    PRIORITY = 86 => "priority",
    PRIORITY_ARRAY = 87 => "priorityArray",
    PRIORITY_FOR_WRITING = 88 => "priorityForWriting",
    PROCESS_IDENTIFIER = 89 => "processIdentifier",
    PROGRAM_CHANGE = 90 => "programChange",
    PROGRAM_LOCATION = 91 => "programLocation",
    PROGRAM_STATE = 92 => "programState",
    PROPORTIONAL_CONSTANT = 93 => "proportionalConstant",
    PROPORTIONAL_CONSTANT_UNITS = 94 => "proportionalConstantUnits",
    PROTOCOL_OBJECT_TYPES_SUPPORTED = 96 => "protocolObjectTypesSupported",
    PROTOCOL_SERVICES_SUPPORTED = 97 => "protocolServicesSupported",
    PROTOCOL_VERSION = 98 => "protocolVersion",
    READ_ONLY = 99 => "readOnly",
    REASON_FOR_HALT = 100 => "reasonForHalt",
    RECIPIENT_LIST = 102 => "recipientList",
    RELIABILITY = 103 => "reliability",
    RELINQUISH_DEFAULT = 104 => "relinquishDefault",
    REQUIRED = 105 => "required",
    RESOLUTION = 106 => "resolution",
    SEGMENTATION_SUPPORTED = 107 => "segmentationSupported",
    SETPOINT = 108 => "setpoint",
    SETPOINT_REFERENCE = 109 => "setpointReference",
    STATE_TEXT = 110 => "stateText",
    STATUS_FLAGS = 111 => "statusFlags",
    SYSTEM_STATUS = 112 => "systemStatus",
    TIME_DELAY = 113 => "timeDelay",
    TIME_OF_ACTIVE_TIME_RESET = 114 => "timeOfActiveTimeReset",
    TIME_OF_STATE_COUNT_RESET = 115 => "timeOfStateCountReset",
    TIME_SYNCHRONIZATION_RECIPIENTS = 116 => "timeSynchronizationRecipients",
    UNITS = 117 => "units",
    UPDATE_INTERVAL = 118 => "updateInterval",
    UTC_OFFSET = 119 => "utcOffset",
    VENDOR_IDENTIFIER = 120 => "vendorIdentifier",
    VENDOR_NAME = 121 => "vendorName",
    VT_CLASSES_SUPPORTED = 122 => "vtClassesSupported",
    WEEKLY_SCHEDULE = 123 => "weeklySchedule",
    ATTEMPTED_SAMPLES = 124 => "attemptedSamples",
    AVERAGE_VALUE = 125 => "averageValue",
    BUFFER_SIZE = 126 => "bufferSize",
    CLIENT_COV_INCREMENT = 127 => "clientCovIncrement",
    COV_RESUBSCRIPTION_INTERVAL = 128 => "covResubscriptionInterval",
    EVENT_TIME_STAMPS = 130 => "eventTimeStamps",
    LOG_BUFFER = 131 => "logBuffer",
    LOG_DEVICE_OBJECT_PROPERTY = 132 => "logDeviceObjectProperty",
    ENABLE = 133 => "enable",
    LOG_INTERVAL = 134 => "logInterval",
    MAXIMUM_VALUE = 135 => "maximumValue",
    MINIMUM_VALUE = 136 => "minimumValue",
    NOTIFICATION_THRESHOLD = 137 => "notificationThreshold",
    PROTOCOL_REVISION = 139 => "protocolRevision",
    RECORDS_SINCE_NOTIFICATION = 140 => "recordsSinceNotification",
    RECORD_COUNT = 141 => "recordCount",
    START_TIME = 142 => "startTime",
    STOP_TIME = 143 => "stopTime",
    STOP_WHEN_FULL = 144 => "stopWhenFull",
    TOTAL_RECORD_COUNT = 145 => "totalRecordCount",
    VALID_SAMPLES = 146 => "validSamples",
    WINDOW_INTERVAL = 147 => "windowInterval",
    WINDOW_SAMPLES = 148 => "windowSamples",
    MAXIMUM_VALUE_TIMESTAMP = 149 => "maximumValueTimestamp",
    MINIMUM_VALUE_TIMESTAMP = 150 => "minimumValueTimestamp",
    VARIANCE_VALUE = 151 => "varianceValue",
    ACTIVE_COV_SUBSCRIPTIONS = 152 => "activeCovSubscriptions",
    BACKUP_FAILURE_TIMEOUT = 153 => "backupFailureTimeout",
    CONFIGURATION_FILES = 154 => "configurationFiles",
    DATABASE_REVISION = 155 => "databaseRevision",
    DIRECT_READING = 156 => "directReading",
    LAST_RESTORE_TIME = 157 => "lastRestoreTime",
    MAINTENANCE_REQUIRED = 158 => "maintenanceRequired",
    MEMBER_OF = 159 => "memberOf",
    MODE = 160 => "mode",
    OPERATION_EXPECTED = 161 => "operationExpected",
    SETTING = 162 => "setting",
    SILENCED = 163 => "silenced",
    TRACKING_VALUE = 164 => "trackingValue",
    ZONE_MEMBERS = 165 => "zoneMembers",
    LIFE_SAFETY_ALARM_VALUES = 166 => "lifeSafetyAlarmValues",
    MAX_SEGMENTS_ACCEPTED = 167 => "maxSegmentsAccepted",
    PROFILE_NAME = 168 => "profileName",
    AUTO_SLAVE_DISCOVERY = 169 => "autoSlaveDiscovery",
    MANUAL_SLAVE_ADDRESS_BINDING = 170 => "manualSlaveAddressBinding",
    SLAVE_ADDRESS_BINDING = 171 => "slaveAddressBinding",
    SLAVE_PROXY_ENABLE = 172 => "slaveProxyEnable",
    LAST_NOTIFY_RECORD = 173 => "lastNotifyRecord",
    SCHEDULE_DEFAULT = 174 => "scheduleDefault",
    ACCEPTED_MODES = 175 => "acceptedModes",
    ADJUST_VALUE = 176 => "adjustValue",
    COUNT = 177 => "count",
    COUNT_BEFORE_CHANGE = 178 => "countBeforeChange",
    COUNT_CHANGE_TIME = 179 => "countChangeTime",
    COV_PERIOD = 180 => "covPeriod",
    INPUT_REFERENCE = 181 => "inputReference",
    LIMIT_MONITORING_INTERVAL = 182 => "limitMonitoringInterval",
    LOGGING_OBJECT = 183 => "loggingObject",
    LOGGING_RECORD = 184 => "loggingRecord",
    PRESCALE = 185 => "prescale",
    PULSE_RATE = 186 => "pulseRate",
    SCALE = 187 => "scale",
    SCALE_FACTOR = 188 => "scaleFactor",
    UPDATE_TIME = 189 => "updateTime",
    VALUE_BEFORE_CHANGE = 190 => "valueBeforeChange",
    VALUE_SET = 191 => "valueSet",
    VALUE_CHANGE_TIME = 192 => "valueChangeTime",
    ALIGN_INTERVALS = 193 => "alignIntervals",
    INTERVAL_OFFSET = 195 => "intervalOffset",
    LAST_RESTART_REASON = 196 => "lastRestartReason",
    LOGGING_TYPE = 197 => "loggingType",
    RESTART_NOTIFICATION_RECIPIENTS = 202 => "restartNotificationRecipients",
    TIME_OF_DEVICE_RESTART = 203 => "timeOfDeviceRestart",
    TIME_SYNCHRONIZATION_INTERVAL = 204 => "timeSynchronizationInterval",
    TRIGGER = 205 => "trigger",
    UTC_TIME_SYNCHRONIZATION_RECIPIENTS = 206 => "utcTimeSynchronizationRecipients",
    NODE_SUBTYPE = 207 => "nodeSubtype",
    NODE_TYPE = 208 => "nodeType",
    STRUCTURED_OBJECT_LIST = 209 => "structuredObjectList",
    SUBORDINATE_ANNOTATIONS = 210 => "subordinateAnnotations",
    SUBORDINATE_LIST = 211 => "subordinateList",
    ACTUAL_SHED_LEVEL = 212 => "actualShedLevel",
    DUTY_WINDOW = 213 => "dutyWindow",
    EXPECTED_SHED_LEVEL = 214 => "expectedShedLevel",
    FULL_DUTY_BASELINE = 215 => "fullDutyBaseline",
    REQUESTED_SHED_LEVEL = 218 => "requestedShedLevel",
    SHED_DURATION = 219 => "shedDuration",
    SHED_LEVEL_DESCRIPTIONS = 220 => "shedLevelDescriptions",
    SHED_LEVELS = 221 => "shedLevels",
    STATE_DESCRIPTION = 222 => "stateDescription",
    DOOR_ALARM_STATE = 226 => "doorAlarmState",
    DOOR_EXTENDED_PULSE_TIME = 227 => "doorExtendedPulseTime",
    DOOR_MEMBERS = 228 => "doorMembers",
    DOOR_OPEN_TOO_LONG_TIME = 229 => "doorOpenTooLongTime",
    DOOR_PULSE_TIME = 230 => "doorPulseTime",
    DOOR_STATUS = 231 => "doorStatus",
    DOOR_UNLOCK_DELAY_TIME = 232 => "doorUnlockDelayTime",
    LOCK_STATUS = 233 => "lockStatus",
    MASKED_ALARM_VALUES = 234 => "maskedAlarmValues",
    SECURED_STATUS = 235 => "securedStatus",
    ABSENTEE_LIMIT = 244 => "absenteeLimit",
    ACCESS_ALARM_EVENTS = 245 => "accessAlarmEvents",
    ACCESS_DOORS = 246 => "accessDoors",
    ACCESS_EVENT = 247 => "accessEvent",
    ACCESS_EVENT_AUTHENTICATION_FACTOR = 248 => "accessEventAuthenticationFactor",
    ACCESS_EVENT_CREDENTIAL = 249 => "accessEventCredential",
    ACCESS_EVENT_TIME = 250 => "accessEventTime",
    ACCESS_TRANSACTION_EVENTS = 251 => "accessTransactionEvents",
    ACCOMPANIMENT = 252 => "accompaniment",
    ACCOMPANIMENT_TIME = 253 => "accompanimentTime",
    ACTIVATION_TIME = 254 => "activationTime",
    ACTIVE_AUTHENTICATION_POLICY = 255 => "activeAuthenticationPolicy",
    ASSIGNED_ACCESS_RIGHTS = 256 => "assignedAccessRights",
    AUTHENTICATION_FACTORS = 257 => "authenticationFactors",
    AUTHENTICATION_POLICY_LIST = 258 => "authenticationPolicyList",
    AUTHENTICATION_POLICY_NAMES = 259 => "authenticationPolicyNames",
    AUTHENTICATION_STATUS = 260 => "authenticationStatus",
    AUTHORIZATION_MODE = 261 => "authorizationMode",
    BELONGS_TO = 262 => "belongsTo",
    CREDENTIAL_DISABLE = 263 => "credentialDisable",
    CREDENTIAL_STATUS = 264 => "credentialStatus",
    CREDENTIALS = 265 => "credentials",
    CREDENTIALS_IN_ZONE = 266 => "credentialsInZone",
    DAYS_REMAINING = 267 => "daysRemaining",
    ENTRY_POINTS = 268 => "entryPoints",
    EXIT_POINTS = 269 => "exitPoints",
    EXPIRATION_TIME = 270 => "expirationTime",
    EXTENDED_TIME_ENABLE = 271 => "extendedTimeEnable",
    FAILED_ATTEMPT_EVENTS = 272 => "failedAttemptEvents",
    FAILED_ATTEMPTS = 273 => "failedAttempts",
    FAILED_ATTEMPTS_TIME = 274 => "failedAttemptsTime",
    LAST_ACCESS_EVENT = 275 => "lastAccessEvent",
    LAST_ACCESS_POINT = 276 => "lastAccessPoint",
    LAST_CREDENTIAL_ADDED = 277 => "lastCredentialAdded",
    LAST_CREDENTIAL_ADDED_TIME = 278 => "lastCredentialAddedTime",
    LAST_CREDENTIAL_REMOVED = 279 => "lastCredentialRemoved",
    LAST_CREDENTIAL_REMOVED_TIME = 280 => "lastCredentialRemovedTime",
    LAST_USE_TIME = 281 => "lastUseTime",
    LOCKOUT = 282 => "lockout",
    LOCKOUT_RELINQUISH_TIME = 283 => "lockoutRelinquishTime",
    MAX_FAILED_ATTEMPTS = 285 => "maxFailedAttempts",
    MEMBERS = 286 => "members",
    MUSTER_POINT = 287 => "musterPoint",
    NEGATIVE_ACCESS_RULES = 288 => "negativeAccessRules",
    NUMBER_OF_AUTHENTICATION_POLICIES = 289 => "numberOfAuthenticationPolicies",
    OCCUPANCY_COUNT = 290 => "occupancyCount",
    OCCUPANCY_COUNT_ADJUST = 291 => "occupancyCountAdjust",
    OCCUPANCY_COUNT_ENABLE = 292 => "occupancyCountEnable",
    OCCUPANCY_LOWER_LIMIT = 294 => "occupancyLowerLimit",
    OCCUPANCY_LOWER_LIMIT_ENFORCED = 295 => "occupancyLowerLimitEnforced",
    OCCUPANCY_STATE = 296 => "occupancyState",
    OCCUPANCY_UPPER_LIMIT = 297 => "occupancyUpperLimit",
    OCCUPANCY_UPPER_LIMIT_ENFORCED = 298 => "occupancyUpperLimitEnforced",
    PASSBACK_MODE = 300 => "passbackMode",
    PASSBACK_TIMEOUT = 301 => "passbackTimeout",
    POSITIVE_ACCESS_RULES = 302 => "positiveAccessRules",
    REASON_FOR_DISABLE = 303 => "reasonForDisable",
    SUPPORTED_FORMATS = 304 => "supportedFormats",
    SUPPORTED_FORMAT_CLASSES = 305 => "supportedFormatClasses",
    THREAT_AUTHORITY = 306 => "threatAuthority",
    THREAT_LEVEL = 307 => "threatLevel",
    TRACE_FLAG = 308 => "traceFlag",
    TRANSACTION_NOTIFICATION_CLASS = 309 => "transactionNotificationClass",
    USER_EXTERNAL_IDENTIFIER = 310 => "userExternalIdentifier",
    USER_INFORMATION_REFERENCE = 311 => "userInformationReference",
    USER_NAME = 317 => "userName",
    USER_TYPE = 318 => "userType",
    USES_REMAINING = 319 => "usesRemaining",
    ZONE_FROM = 320 => "zoneFrom",
    ZONE_TO = 321 => "zoneTo",
    ACCESS_EVENT_TAG = 322 => "accessEventTag",
    GLOBAL_IDENTIFIER = 323 => "globalIdentifier",
    VERIFICATION_TIME = 326 => "verificationTime",
    BASE_DEVICE_SECURITY_POLICY = 327 => "baseDeviceSecurityPolicy",
    DISTRIBUTION_KEY_REVISION = 328 => "distributionKeyRevision",
    DO_NOT_HIDE = 329 => "doNotHide",
    KEY_SETS = 330 => "keySets",
    LAST_KEY_SERVER = 331 => "lastKeyServer",
    NETWORK_ACCESS_SECURITY_POLICIES = 332 => "networkAccessSecurityPolicies",
    PACKET_REORDER_TIME = 333 => "packetReorderTime",
    SECURITY_PDU_TIMEOUT = 334 => "securityPduTimeout",
    SECURITY_TIME_WINDOW = 335 => "securityTimeWindow",
    SUPPORTED_SECURITY_ALGORITHMS = 336 => "supportedSecurityAlgorithms",
    UPDATE_KEY_SET_TIMEOUT = 337 => "updateKeySetTimeout",
    BACKUP_AND_RESTORE_STATE = 338 => "backupAndRestoreState",
    BACKUP_PREPARATION_TIME = 339 => "backupPreparationTime",
    RESTORE_COMPLETION_TIME = 340 => "restoreCompletionTime",
    RESTORE_PREPARATION_TIME = 341 => "restorePreparationTime",
    BIT_MASK = 342 => "bitMask",
    BIT_TEXT = 343 => "bitText",
    IS_UTC = 344 => "isUtc",
    GROUP_MEMBERS = 345 => "groupMembers",
    GROUP_MEMBER_NAMES = 346 => "groupMemberNames",
    MEMBER_STATUS_FLAGS = 347 => "memberStatusFlags",
    REQUESTED_UPDATE_INTERVAL = 348 => "requestedUpdateInterval",
    COVU_PERIOD = 349 => "covuPeriod",
    COVU_RECIPIENTS = 350 => "covuRecipients",
    EVENT_MESSAGE_TEXTS = 351 => "eventMessageTexts",
    EVENT_MESSAGE_TEXTS_CONFIG = 352 => "eventMessageTextsConfig",
    EVENT_DETECTION_ENABLE = 353 => "eventDetectionEnable",
    EVENT_ALGORITHM_INHIBIT = 354 => "eventAlgorithmInhibit",
    EVENT_ALGORITHM_INHIBIT_REF = 355 => "eventAlgorithmInhibitRef",
    TIME_DELAY_NORMAL = 356 => "timeDelayNormal",
    RELIABILITY_EVALUATION_INHIBIT = 357 => "reliabilityEvaluationInhibit",
    FAULT_PARAMETERS = 358 => "faultParameters",
    FAULT_TYPE = 359 => "faultType",
    LOCAL_FORWARDING_ONLY = 360 => "localForwardingOnly",
    PROCESS_IDENTIFIER_FILTER = 361 => "processIdentifierFilter",
    SUBSCRIBED_RECIPIENTS = 362 => "subscribedRecipients",
    PORT_FILTER = 363 => "portFilter",
    AUTHORIZATION_EXEMPTIONS = 364 => "authorizationExemptions",
    ALLOW_GROUP_DELAY_INHIBIT = 365 => "allowGroupDelayInhibit",
    CHANNEL_NUMBER = 366 => "channelNumber",
    CONTROL_GROUPS = 367 => "controlGroups",
    EXECUTION_DELAY = 368 => "executionDelay",
    LAST_PRIORITY = 369 => "lastPriority",
    WRITE_STATUS = 370 => "writeStatus",
    PROPERTY_LIST = 371 => "propertyList",
    SERIAL_NUMBER = 372 => "serialNumber",
    BLINK_WARN_ENABLE = 373 => "blinkWarnEnable",
    DEFAULT_FADE_TIME = 374 => "defaultFadeTime",
    DEFAULT_RAMP_RATE = 375 => "defaultRampRate",
    DEFAULT_STEP_INCREMENT = 376 => "defaultStepIncrement",
    EGRESS_TIME = 377 => "egressTime",
    IN_PROGRESS = 378 => "inProgress",
    INSTANTANEOUS_POWER = 379 => "instantaneousPower",
    LIGHTING_COMMAND = 380 => "lightingCommand",
    LIGHTING_COMMAND_DEFAULT_PRIORITY = 381 => "lightingCommandDefaultPriority",
    MAX_ACTUAL_VALUE = 382 => "maxActualValue",
    MIN_ACTUAL_VALUE = 383 => "minActualValue",
    POWER = 384 => "power",
    TRANSITION = 385 => "transition",
    EGRESS_ACTIVE = 386 => "egressActive",
}

impl PropertyIdentifier {
    /// True for proprietary (vendor-specific) codes.
    pub fn is_proprietary(self) -> bool {
        (512..=4_194_303).contains(&self.0)
    }
}

impl Default for PropertyIdentifier {
    fn default() -> Self {
        Self::PRESENT_VALUE
    }
}
